//! One-shot batch tasks, run out-of-band via CLI flags rather than as part
//! of request serving. Both are idempotent and safely restartable.

pub mod migrate_tags;
pub mod sweep_orphans;
