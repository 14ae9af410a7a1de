//! End-to-end pipeline runs over on-disk fixtures.

use std::fs;

use lt_pipeline::{run_from_paths, InputPaths, ParamOverrides, PipelineError, PipelineOutputs, SeedSource};

const TS: &str = "2026-05-01T09:30:00Z";

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(params: &str, applicants: &str, shows: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("params.json"), params).unwrap();
        fs::write(dir.path().join("applicants.csv"), applicants).unwrap();
        fs::write(dir.path().join("shows.csv"), shows).unwrap();
        Fixture { dir }
    }

    fn with_vacancy(self, body: &str) -> Self {
        fs::write(self.dir.path().join("vacancy.csv"), body).unwrap();
        self
    }

    fn paths(&self) -> InputPaths {
        let p = self.dir.path();
        InputPaths {
            params: Some(p.join("params.json")),
            applicants: p.join("applicants.csv"),
            shows: p.join("shows.csv"),
            vacancy: Some(p.join("vacancy.csv")),
        }
    }

    fn run(&self, overrides: &ParamOverrides) -> Result<PipelineOutputs, PipelineError> {
        run_from_paths(&self.paths(), overrides, TS)
    }
}

fn wins(out: &PipelineOutputs, id: &str) -> Vec<String> {
    out.result.body.applicants.iter().find(|a| a.id == id).map(|a| a.wins.clone()).unwrap()
}

fn holders(out: &PipelineOutputs, id: &str) -> Vec<String> {
    out.result.body.shows.iter().find(|s| s.id == id).map(|s| s.holders.clone()).unwrap()
}

fn result_json(out: &PipelineOutputs) -> Vec<u8> {
    lt_pipeline::result_bytes(&out.result).unwrap()
}


const SHOWS_A: &str = "id,slot,play,capacity\nR1,morning,playX,1\nR2,afternoon,playY,1\n";
const APPS_A: &str = "id,first,second\nP1,R1,R2\nP2,R1,R2\n";

#[test]
fn scenario_a_two_applicants_two_single_seat_shows() {
    let fx = Fixture::new(r#"{"max_orders": 2, "seed": 1}"#, APPS_A, SHOWS_A);
    let out = fx.run(&ParamOverrides::default()).unwrap();

    assert_eq!(wins(&out, "P1"), vec!["R2"]);
    assert_eq!(wins(&out, "P2"), vec!["R1"]);
    assert_eq!(holders(&out, "R1"), vec!["P2"]);
    assert_eq!(holders(&out, "R2"), vec!["P1"]);
    assert_eq!(out.run_record.body.seed.source, SeedSource::Configured);
    assert_eq!(out.run_record.body.allocation.rounds_run, 2);
    assert_eq!(out.result.body.summary.seats_filled, 2);
    assert!(!out.run_record.body.allocation.backfill_ran);
}

#[test]
fn scenario_b_shared_slot_blocks_second_win() {
    let shows = "id,slot,play,capacity\nR1,morning,playX,2\nR3,morning,playZ,2\n";
    let fx = Fixture::new(r#"{"max_orders": 2, "seed": 1}"#, "id,a,b\nP3,R1,R3\n", shows);
    let out = fx.run(&ParamOverrides::default()).unwrap();

    assert_eq!(wins(&out, "P3"), vec!["R1"]);
    assert!(holders(&out, "R3").is_empty());
    assert_eq!(out.run_record.body.allocation.draws, 0);
}

const SHOWS_CD: &str = "id,slot,play,capacity\nR1,morning,playX,1\nR2,afternoon,playY,1\nR3,evening,playZ,1\n";

#[test]
fn scenario_c_disabled_vacancy_leaves_initial_state() {
    let fx = Fixture::new(r#"{"max_orders": 2, "seed": 1, "enable_vacancy": false}"#, APPS_A, SHOWS_CD)
        .with_vacancy("id\nP1\nP2\n");
    let out = fx.run(&ParamOverrides::default()).unwrap();

    assert!(holders(&out, "R3").is_empty());
    let alloc = &out.run_record.body.allocation;
    assert!(!alloc.backfill_ran);
    assert_eq!(alloc.backfill_grants, 0);
    assert!(out.run_record.body.grants.iter().all(|g| g.phase == "initial"));
}

#[test]
fn scenario_d_empty_vacancy_list_changes_nothing() {
    let params = r#"{"max_orders": 2, "seed": 1, "enable_vacancy": true}"#;
    let enabled = Fixture::new(params, APPS_A, SHOWS_CD).with_vacancy("id\n");
    let out = enabled.run(&ParamOverrides::default()).unwrap();
    assert!(out.run_record.body.allocation.backfill_ran);
    assert_eq!(out.run_record.body.allocation.backfill_candidates, 0);
    assert_eq!(out.run_record.body.allocation.backfill_grants, 0);

    let disabled = Fixture::new(params, APPS_A, SHOWS_CD);
    let baseline = disabled.run(&ParamOverrides { enable_vacancy: Some(false), ..Default::default() }).unwrap();
    assert_eq!(result_json(&out), result_json(&baseline));
    assert_eq!(out.run_record.body.allocation.draws, baseline.run_record.body.allocation.draws);
}

#[test]
fn backfill_gives_leftover_seat_to_opted_in_applicant() {
    let params = r#"{"max_orders": 1, "seed": 1, "enable_vacancy": true}"#;
    let fx = Fixture::new(params, "id,a\nP1,R1\nP2,R1\n", SHOWS_A).with_vacancy("id\nP1\nP2\nP9\n");
    let out = fx.run(&ParamOverrides::default()).unwrap();

    assert_eq!(holders(&out, "R1").len(), 1);
    assert_eq!(holders(&out, "R2").len(), 1);
    assert_ne!(holders(&out, "R1"), holders(&out, "R2"));
    let bf: Vec<_> = out.run_record.body.grants.iter().filter(|g| g.phase == "backfill").collect();
    assert_eq!(bf.len(), 1);
    assert_eq!(bf[0].rank, None);
    assert!(out.report.warnings().any(|w| w.code == "unknown_opt_in"));
}

#[test]
fn identical_inputs_and_seed_are_byte_identical() {
    let fx = Fixture::new(r#"{"max_orders": 2}"#, APPS_A, SHOWS_A);
    let ov = ParamOverrides { seed: Some(20_260_501), ..Default::default() };
    let a = fx.run(&ov).unwrap();
    let b = fx.run(&ov).unwrap();
    assert_eq!(result_json(&a), result_json(&b));
    assert_eq!(a.result.id, b.result.id);
    assert_eq!(a.run_record.id, b.run_record.id);
    assert!(a.run_record.id.starts_with("RUN:2026-05-01T09:30:00Z-"));
}

#[test]
fn missing_seed_is_resolved_and_recorded() {
    let fx = Fixture::new("{}", APPS_A, SHOWS_A);
    let out = fx.run(&ParamOverrides::default()).unwrap();
    assert_eq!(out.run_record.body.seed.source, SeedSource::Clock);
    assert!(out.run_record.body.seed.value > 0);
}

#[test]
fn duplicate_ids_abort_before_allocation() {
    let apps = "id,a\nP1,R1\nP2,R1\nP1,R2\n";
    let shows = "id,slot,play,capacity\nR1,am,x,1\nR2,pm,y,1\nR2,ev,z,1\n";
    let fx = Fixture::new(r#"{"max_orders": 1, "seed": 3}"#, apps, shows);
    match fx.run(&ParamOverrides::default()) {
        Err(PipelineError::Validate(msg)) => {
            assert!(msg.contains("duplicate applicant ids: P1"), "{msg}");
            assert!(msg.contains("duplicate show ids: R2"), "{msg}");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn strict_preferences_rejects_unknown_show() {
    let fx = Fixture::new(r#"{"max_orders": 2, "seed": 1}"#, "id,a,b\nP1,R1,R7\n", SHOWS_A);
    assert!(fx.run(&ParamOverrides::default()).is_ok());
    let strict = ParamOverrides { strict_preferences: Some(true), ..Default::default() };
    assert!(matches!(fx.run(&strict), Err(PipelineError::Validate(_))));
}

#[test]
fn malformed_capacity_is_a_validation_error() {
    let fx = Fixture::new("{}", APPS_A, "id,slot,play,capacity\nR1,am,x,many\n");
    let err = fx.run(&ParamOverrides::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Validate(_)), "{err}");
}
