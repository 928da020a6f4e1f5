use std::sync::Arc;

use crate::application::chrome::ChromeService;
use crate::application::followers::FollowerService;
use crate::application::posts::PostService;
use crate::application::profile::ProfileService;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub profile: Arc<ProfileService>,
    pub followers: Arc<FollowerService>,
    pub chrome: Arc<ChromeService>,
}
