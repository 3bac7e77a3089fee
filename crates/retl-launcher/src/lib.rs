mod environment;
mod kubernetes;
mod launcher;
mod naming;
mod scheduler;

pub use environment::{build_environment, flatten_value};
pub use kubernetes::{pod_manifest, KubernetesScheduler};
pub use launcher::{ImageSet, LaunchRequest, Launcher};
pub use naming::{sanitize_name, unit_name};
pub use scheduler::{ExecutionUnitSpec, Scheduler, SubmittedUnit};
