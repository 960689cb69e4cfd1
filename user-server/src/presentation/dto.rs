use crate::domain::user::{NewUser, User, UserPatch};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const USERS_PATH: &str = "/api/v1/users";

// ======================= USERS =======================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// 2 to 100 characters after trimming.
    #[schema(example = "Ivan")]
    pub name: String,
    #[schema(example = "ivan@example.com")]
    pub email: String,
    /// 1 to 150.
    #[schema(example = 25)]
    pub age: i32,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser::new(req.name, req.email, req.age)
    }
}

/// Missing keys and explicit `null` both mean "leave unchanged".
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            name: req.name.into(),
            email: req.email.into(),
            age: req.age.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UserLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub users_list: Link,
    pub update: Link,
    pub delete: Link,
}

impl UserLinks {
    pub fn for_user(id: Uuid) -> Self {
        let item = format!("{USERS_PATH}/{id}");
        Self {
            self_link: Link { href: item.clone() },
            users_list: Link {
                href: USERS_PATH.to_string(),
            },
            update: Link { href: item.clone() },
            delete: Link { href: item },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub created_at: String,
    #[serde(rename = "_links")]
    pub links: UserLinks,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            links: UserLinks::for_user(user.id),
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::FieldUpdate;

    #[test]
    fn update_request_treats_null_and_missing_alike() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{ "name": null, "age": 30 }"#).unwrap();
        let patch = UserPatch::from(req);

        assert_eq!(patch.name, FieldUpdate::Keep);
        assert_eq!(patch.email, FieldUpdate::Keep);
        assert_eq!(patch.age, FieldUpdate::Set(30));
    }

    #[test]
    fn response_carries_navigation_links() {
        let user = User::new("Ivan".into(), "ivan@x.com".into(), 25);
        let id = user.id;
        let value = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(value["_links"]["self"]["href"], format!("/api/v1/users/{id}"));
        assert_eq!(value["_links"]["users_list"]["href"], "/api/v1/users");
        assert_eq!(value["created_at"].as_str().unwrap().len(), 19);
    }
}
