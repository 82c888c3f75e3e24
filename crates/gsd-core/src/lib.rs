//! GSD Core - planning document logic
//!
//! Everything between "here is the text of STATE.md / ROADMAP.md" and "here
//! is the JSON report / new file text":
//! - Normalizes free-text status into five canonical states
//! - Keeps the STATE.md frontmatter in sync with its body
//! - Analyzes roadmap phases against phase directories
//! - Applies section-aware mutations to STATE.md
//! - Builds the `init` payloads workflows start from
//!
//! Nothing here touches the file system. Documents come in as
//! `Option<&str>` (`None` = file absent) and phase directories through the
//! [`PhaseSource`] trait.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use gsd_core::{snapshot, StateMutator, Status};
//!
//! let doc = "# Project State\n\n**Status:** Ready to plan\n\n## Blockers\nNone\n";
//! let out = StateMutator::new(Utc::now())
//!     .add_blocker(doc, "Waiting on vendor quote $1.00")
//!     .unwrap();
//!
//! let snap = snapshot(Some(&out.document)).ready().unwrap();
//! assert_eq!(snap.blockers, vec!["Waiting on vendor quote $1.00".to_string()]);
//! assert_eq!(snap.status_normalized, Some(Status::Planning));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod init;
pub mod mutator;
pub mod roadmap;
pub mod state;
pub mod status;
pub mod types;

// Re-exports for convenience
pub use config::PlanningConfig;
pub use error::{CoreError, CoreResult};
pub use frontmatter::{StateFrontmatter, STATE_VERSION};
pub use init::{init, InitInputs, InitReport, InitWorkflow};
pub use mutator::{
    BlockerAdded, BlockerResolved, DecisionAdded, Mutation, PatchReport, StateMutator,
};
pub use roadmap::{analyze, get_phase, PhaseLookup, PhaseRecord, RoadmapReport};
pub use state::{snapshot, StateSnapshot, StateValue};
pub use status::{normalize, Status};
pub use types::{
    Decision, DiskStatus, Outcome, PhaseDirectory, PhaseNumber, PhaseSource, PlanningFile,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with GSD Core
    pub use crate::{
        analyze, get_phase, init, snapshot, InitInputs, InitWorkflow, Outcome, PhaseDirectory,
        PhaseNumber, PhaseSource, PlanningConfig, StateMutator, Status,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mutate_then_read_round_trip() {
        let now = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let doc = "# Project State

**Current Phase:** 07
**Current Phase Name:** Production
**Total Phases:** 10
**Status:** In progress
**Current Plan:** 07-05
**Progress:** 70%
";
        let out = StateMutator::new(now)
            .patch_fields(doc, &[("Status", "Executing Plan 5")])
            .unwrap();

        let fm = frontmatter::read(&out.document, now);
        assert_eq!(fm.current_phase.as_deref(), Some("07"));
        assert_eq!(fm.current_phase_name.as_deref(), Some("Production"));
        assert_eq!(fm.status, Status::Executing);
        assert!(fm.last_updated.is_some());
    }

    #[test]
    fn analyzer_and_init_agree() {
        let roadmap = "### Phase 1: Foundation\n**Goal:** Base\n### Phase 2: API\n**Requirements**: API-01\n";
        let dirs = vec![
            PhaseDirectory::new("01-foundation", ["01-01-PLAN.md", "01-01-SUMMARY.md"]),
            PhaseDirectory::new("02-api", ["02-01-PLAN.md"]),
        ];
        let report = analyze(Some(roadmap), &dirs).ready().unwrap();
        let current = PhaseNumber::parse(report.current_phase.as_deref().unwrap()).unwrap();

        let payload = init(
            &InitWorkflow::ExecutePhase(current),
            InitInputs {
                roadmap: Some(roadmap),
                config: None,
                phases: &dirs,
            },
        );
        let facts = payload.phase.unwrap();
        assert_eq!(facts.phase_dir.as_deref(), Some(".planning/phases/02-api"));
        assert_eq!(facts.phase_req_ids.as_deref(), Some("API-01"));
        assert_eq!(facts.incomplete_plans, Some(vec!["02-01".to_string()]));
    }
}
