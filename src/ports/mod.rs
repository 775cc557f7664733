pub mod approval;
pub mod locker;
pub mod steps;
pub mod webhooks;
pub mod working_dir;

pub use approval::PullApprovedChecker;
pub use locker::{
    LockAttempt, LockUrlGenerator, ProjectLockGuard, ProjectLocker, WorkingDirGuard,
    WorkingDirLocker,
};
pub use steps::{CustomStepRunner, StepRunner};
pub use webhooks::WebhooksSender;
pub use working_dir::WorkingDir;
