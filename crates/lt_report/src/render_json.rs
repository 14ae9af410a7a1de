//! Report JSON renderer.
//!
//! Key order follows section order (cover → snapshot → shows → distribution →
//! allocation → integrity); this relies on serde_json's `preserve_order`.

use serde_json::{Map as JsonMap, Value};

use crate::{ReportModel, SectionIntegrity, SnapshotVar};

pub fn render_report_json(m: &ReportModel) -> Value {
    let mut root = obj();

    let mut cover = obj();
    cover.insert("title".into(), m.cover.title.clone().into());
    cover.insert("applicants".into(), m.cover.applicants.into());
    cover.insert("shows".into(), m.cover.shows.into());
    cover.insert("seats_filled".into(), m.cover.seats_filled.into());
    cover.insert("total_capacity".into(), m.cover.total_capacity.into());
    cover.insert("fill_pct".into(), m.cover.fill_pct_1dp.clone().into());
    cover.insert("applicants_with_wins".into(), m.cover.applicants_with_wins.into());
    root.insert("cover".into(), Value::Object(cover));

    if let Some(s) = &m.snapshot {
        root.insert("snapshot".into(), kv_object(&s.items));
    }

    let shows = m
        .shows
        .iter()
        .map(|s| {
            let mut o = obj();
            o.insert("id".into(), s.id.clone().into());
            o.insert("slot".into(), s.slot.clone().into());
            o.insert("play".into(), s.play.clone().into());
            o.insert("capacity".into(), s.capacity.into());
            o.insert("holder_count".into(), s.holder_count.into());
            o.insert("holders".into(), s.holders.clone().into());
            Value::Object(o)
        })
        .collect::<Vec<_>>();
    root.insert("shows".into(), Value::Array(shows));

    let dist = m
        .distribution
        .iter()
        .map(|d| {
            let mut o = obj();
            o.insert("wins".into(), d.wins.into());
            o.insert("applicants".into(), d.applicants.into());
            Value::Object(o)
        })
        .collect::<Vec<_>>();
    root.insert("distribution".into(), Value::Array(dist));

    if let Some(a) = &m.allocation {
        let mut o = obj();
        o.insert("rounds_run".into(), a.rounds_run.into());
        o.insert("initial_grants".into(), a.initial_grants.into());
        o.insert("backfill_ran".into(), a.backfill_ran.into());
        o.insert("backfill_grants".into(), a.backfill_grants.into());
        o.insert("draws".into(), a.draws.into());
        root.insert("allocation".into(), Value::Object(o));
    }

    root.insert("integrity".into(), integrity_json(&m.integrity));
    Value::Object(root)
}

/// Pretty-printed report text.
pub fn render_json(m: &ReportModel) -> String {
    let v = render_report_json(m);
    serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
}

fn integrity_json(i: &SectionIntegrity) -> Value {
    let mut o = obj();
    o.insert("result_id".into(), i.result_id.clone().into());
    for (k, v) in [
        ("run_id", &i.run_id),
        ("timestamp_utc", &i.timestamp_utc),
        ("engine", &i.engine),
        ("seed", &i.seed),
    ] {
        if let Some(v) = v {
            o.insert(k.into(), v.clone().into());
        }
    }
    if !i.input_digests.is_empty() {
        o.insert("inputs".into(), kv_object(&i.input_digests));
    }
    Value::Object(o)
}

fn kv_object(items: &[SnapshotVar]) -> Value {
    let mut o = obj();
    for it in items {
        o.insert(it.key.clone(), it.value.clone().into());
    }
    Value::Object(o)
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
