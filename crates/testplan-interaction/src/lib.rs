pub mod dev_status_client;
pub mod figma_client;
pub mod github_client;
pub mod http;
pub mod jira_client;
pub mod token_health;

pub use dev_status_client::DevStatusClient;
pub use figma_client::FigmaClient;
pub use github_client::GitHubClient;
pub use jira_client::{JiraClient, PostedComment};
pub use token_health::{TokenHealthService, TokenState, TokenStatus};
