//! Typed ID definitions used by the harness.

use crate::define_id;

define_id!(
    HandleId,
    "hdl",
    "Harness-side reference to an externally provisioned resource."
);
define_id!(
    TestCaseId,
    "case",
    "Identifies one execution of a test case; owns the handles it provisions."
);
define_id!(RunId, "run", "Identifies one invocation of the runner.");
