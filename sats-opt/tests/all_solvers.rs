#![allow(unused_macros)]
use rstest_reuse::template;

// This creates a testing "template" to allow for the injection of each solver
// implementation

#[template]
#[rstest]
#[case::microlp(sats_opt::microlp::MicrolpSolver::default())]
pub fn all_solvers(#[case] solver: impl sats_core::ports::MipSolver) -> () {}
