//! Типизированная поверхность маршрутов клиента.

/// Маршруты приложения; сам роутер — внешний компонент,
/// здесь только соответствие «вариант ↔ путь».
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Home,
    AllUsers,
    Explore,
    Saved,
    CreatePost,
    Profile(String),
    LikedPosts(String),
    UpdatePost(String),
    UpdateProfile(String),
    PostDetails(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::SignIn => "/sign-in".to_string(),
            Self::SignUp => "/sign-up".to_string(),
            Self::Home => "/".to_string(),
            Self::AllUsers => "/all-users".to_string(),
            Self::Explore => "/explore".to_string(),
            Self::Saved => "/saved".to_string(),
            Self::CreatePost => "/create-post".to_string(),
            Self::Profile(id) => format!("/profile/{id}"),
            Self::LikedPosts(id) => format!("/profile/{id}/liked-posts"),
            Self::UpdatePost(id) => format!("/update-post/{id}"),
            Self::UpdateProfile(id) => format!("/update-profile/{id}"),
            Self::PostDetails(id) => format!("/posts/{id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            [""] => Some(Self::Home),
            ["sign-in"] => Some(Self::SignIn),
            ["sign-up"] => Some(Self::SignUp),
            ["all-users"] => Some(Self::AllUsers),
            ["explore"] => Some(Self::Explore),
            ["saved"] => Some(Self::Saved),
            ["create-post"] => Some(Self::CreatePost),
            ["profile", id] if !id.is_empty() => Some(Self::Profile((*id).to_string())),
            ["profile", id, "liked-posts"] if !id.is_empty() => {
                Some(Self::LikedPosts((*id).to_string()))
            }
            ["update-post", id] if !id.is_empty() => Some(Self::UpdatePost((*id).to_string())),
            ["update-profile", id] if !id.is_empty() => {
                Some(Self::UpdateProfile((*id).to_string()))
            }
            ["posts", id] if !id.is_empty() => Some(Self::PostDetails((*id).to_string())),
            _ => None,
        }
    }
}
