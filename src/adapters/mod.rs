pub mod github;
pub mod lock_url;
pub mod locks;
pub mod terraform;
pub mod webhooks;
pub mod working_dir;
pub mod working_dir_locker;

pub use github::GithubClient;
pub use lock_url::DefaultLockUrlGenerator;
pub use locks::InMemoryProjectLocker;
pub use terraform::{
    ApplyStepRunner, InitStepRunner, PlanStepRunner, ShellStepRunner, TerraformClient,
};
pub use webhooks::HttpWebhooksSender;
pub use working_dir::FileWorkspace;
pub use working_dir_locker::DefaultWorkingDirLocker;
