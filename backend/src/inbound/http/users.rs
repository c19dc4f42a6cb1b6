//! User API handlers.
//!
//! Every endpoint reads the `Authorization` header, resolves the caller
//! through the auth pipeline, and answers with a response envelope. Request
//! bodies and path parameters are parsed by hand so malformed input also
//! leaves through the envelope mapper instead of a framework error page.

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::StreamExt as _;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::envelope::Envelope;
use super::pipeline::authorized;
use super::state::HttpState;
use super::token::AccessToken;
use crate::domain::ports::ProfileImage;
use crate::domain::{DomainError, GroundMembership, Nickname, PersonalAccessToken, User, UserPatch};

pub(crate) const MSG_USER_FETCHED: &str = "사용자 정보 조회 성공";
pub(crate) const MSG_PROFILE_FETCHED: &str = "사용자 프로필 사진 조회 성공!";
pub(crate) const MSG_GROUND_LIST: &str = "그라운드 목록 조회 성공!";
pub(crate) const MSG_STATUS_MSG_FETCHED: &str = "상태 메시지 조회 성공!";
pub(crate) const MSG_NICKNAME_CHECKED: &str = "닉네임 중복 조회 성공!";
pub(crate) const MSG_PAT_SAVED: &str = "personal access token 저장 성공!";
pub(crate) const MSG_USER_UPDATED: &str = "사용자 정보 수정 성공!";
pub(crate) const MSG_PROFILE_UPDATED: &str = "사용자 프로필 사진 수정 성공!";
pub(crate) const MSG_LAST_GROUND_UPDATED: &str = "사용자가 마지막으로 방문한 그라운드 수정 성공!";
pub(crate) const MSG_PROFILE_DELETED: &str = "프로필 사진 삭제 성공!";
pub(crate) const MSG_USER_DELETED: &str = "사용자 탈퇴 성공!";
pub(crate) const MSG_STATUS_MSG_DELETED: &str = "사용자 상태메시지 삭제 성공!";

/// Upper bound on an uploaded profile image.
pub(crate) const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Body for `PUT /user`: `{"nickname": __, "statusMsg": __}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub nickname: Option<String>,
    pub status_msg: Option<String>,
}

/// Body for `POST /user/personal-access-token`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveTokenRequest {
    pub personal_access_token: String,
}

/// Profile image payload returned by `GET /user/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageDto {
    #[schema(example = "avatar.png")]
    pub file_name: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Base64-encoded image bytes.
    pub content: String,
}

impl From<ProfileImage> for ProfileImageDto {
    fn from(value: ProfileImage) -> Self {
        Self {
            file_name: value.file_name,
            content_type: value.content_type,
            content: BASE64.encode(value.data),
        }
    }
}

/// Query string for `DELETE /user`. `code` is optional at the transport
/// layer so its absence maps to a 400 envelope rather than a framework
/// error.
#[derive(Debug, Deserialize)]
pub struct DeleteUserQuery {
    pub code: Option<String>,
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &web::Bytes) -> Result<T, DomainError> {
    serde_json::from_slice(body)
        .map_err(|error| DomainError::bad_input(format!("요청 본문이 올바르지 않습니다: {error}")))
}

/// Fetch the caller's account.
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "사용자 정보 조회 성공", body = Envelope<User>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "getUserInfo"
)]
#[get("")]
pub async fn get_user_info(state: web::Data<HttpState>, token: AccessToken) -> Envelope<User> {
    authorized(&state.resolver, &token, MSG_USER_FETCHED, |user| async move {
        Ok(user)
    })
    .await
}

/// Fetch the caller's profile image.
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "프로필 사진 조회 성공", body = Envelope<ProfileImageDto>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자 혹은 프로필 사진"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "getUserProfile"
)]
#[get("/profile")]
pub async fn get_user_profile(
    state: web::Data<HttpState>,
    token: AccessToken,
) -> Envelope<ProfileImageDto> {
    let profiles = state.profiles.clone();
    authorized(
        &state.resolver,
        &token,
        MSG_PROFILE_FETCHED,
        move |user| async move {
            let image = profiles.load(&user).await?;
            Ok(ProfileImageDto::from(image))
        },
    )
    .await
}

/// List the grounds the caller belongs to.
#[utoipa::path(
    get,
    path = "/user/ground/list",
    responses(
        (status = 200, description = "그라운드 목록 조회 성공", body = Envelope<Vec<GroundMembership>>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "getGroundList"
)]
#[get("/ground/list")]
pub async fn get_ground_list(
    state: web::Data<HttpState>,
    token: AccessToken,
) -> Envelope<Vec<GroundMembership>> {
    let directory = state.directory.clone();
    authorized(
        &state.resolver,
        &token,
        MSG_GROUND_LIST,
        move |user| async move { Ok(directory.grounds(&user).await?) },
    )
    .await
}

/// Fetch the caller's status message.
#[utoipa::path(
    get,
    path = "/user/status-msg",
    responses(
        (status = 200, description = "상태 메시지 조회 성공", body = Envelope<Option<String>>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "getStatusMsg"
)]
#[get("/status-msg")]
pub async fn get_status_msg(
    state: web::Data<HttpState>,
    token: AccessToken,
) -> Envelope<Option<String>> {
    authorized(
        &state.resolver,
        &token,
        MSG_STATUS_MSG_FETCHED,
        |user| async move { Ok(user.status_msg) },
    )
    .await
}

/// Check whether a nickname is already taken by another account.
#[utoipa::path(
    get,
    path = "/user/nickname/duplicate/{nickname}",
    params(("nickname" = String, Path, description = "중복 체크할 닉네임")),
    responses(
        (status = 200, description = "닉네임 중복 조회 성공", body = Envelope<bool>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "checkDupNickname"
)]
#[get("/nickname/duplicate/{nickname}")]
pub async fn check_dup_nickname(
    state: web::Data<HttpState>,
    token: AccessToken,
    nickname: web::Path<String>,
) -> Envelope<bool> {
    let directory = state.directory.clone();
    let nickname = nickname.into_inner();
    authorized(
        &state.resolver,
        &token,
        MSG_NICKNAME_CHECKED,
        move |user| async move { Ok(directory.is_nickname_taken(&nickname, user.id).await?) },
    )
    .await
}

/// Store or replace the caller's personal access token.
#[utoipa::path(
    post,
    path = "/user/personal-access-token",
    request_body = SaveTokenRequest,
    responses(
        (status = 200, description = "personal access token 저장 성공", body = Envelope<Option<String>>),
        (status = 400, description = "잘못된 요청"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "savePersonalAccessToken"
)]
#[post("/personal-access-token")]
pub async fn save_personal_access_token(
    state: web::Data<HttpState>,
    token: AccessToken,
    body: web::Bytes,
) -> Envelope<Option<String>> {
    let directory = state.directory.clone();
    authorized(&state.resolver, &token, MSG_PAT_SAVED, move |user| async move {
        let request: SaveTokenRequest = parse_json(&body)?;
        let pat = PersonalAccessToken::new(request.personal_access_token)
            .ok_or_else(|| DomainError::bad_input("personal access token이 비어 있습니다"))?;
        info!(user_id = user.id, fingerprint = %pat.fingerprint(), "storing personal access token");
        directory.save_personal_access_token(&user, pat).await?;
        Ok(None)
    })
    .await
}

/// Update the caller's nickname and status message.
#[utoipa::path(
    put,
    path = "/user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "사용자 정보 수정 성공", body = Envelope<User>),
        (status = 400, description = "잘못된 요청"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "updateUserInfo"
)]
#[put("")]
pub async fn update_user_info(
    state: web::Data<HttpState>,
    token: AccessToken,
    body: web::Bytes,
) -> Envelope<User> {
    let directory = state.directory.clone();
    authorized(&state.resolver, &token, MSG_USER_UPDATED, move |user| async move {
        let request: UpdateUserRequest = parse_json(&body)?;
        let nickname = request
            .nickname
            .map(Nickname::new)
            .transpose()
            .map_err(|error| DomainError::bad_input(error.to_string()))?;
        let patch = UserPatch {
            nickname,
            status_msg: request.status_msg,
        };
        Ok(directory.update_info(&user, patch).await?)
    })
    .await
}

/// Replace the caller's profile image from a multipart `file` part.
#[utoipa::path(
    put,
    path = "/user/profile",
    responses(
        (status = 200, description = "프로필 사진 수정 성공", body = Envelope<User>),
        (status = 400, description = "파일 저장 에러"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    token: AccessToken,
    payload: Multipart,
) -> Envelope<User> {
    let profiles = state.profiles.clone();
    authorized(
        &state.resolver,
        &token,
        MSG_PROFILE_UPDATED,
        move |user| async move {
            let image = read_profile_upload(payload).await?;
            profiles.save(&user, image).await?;
            Ok(user)
        },
    )
    .await
}

/// Record the ground the caller visited last.
#[utoipa::path(
    put,
    path = "/user/last-ground/{lastGroundId}",
    params(("lastGroundId" = i32, Path, description = "마지막으로 방문한 그라운드 ID")),
    responses(
        (status = 200, description = "마지막 방문 그라운드 수정 성공", body = Envelope<Option<String>>),
        (status = 400, description = "잘못된 요청"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "updateLastVisitedGround"
)]
#[put("/last-ground/{lastGroundId}")]
pub async fn update_last_visited_ground(
    state: web::Data<HttpState>,
    token: AccessToken,
    last_ground_id: web::Path<String>,
) -> Envelope<Option<String>> {
    let directory = state.directory.clone();
    let raw_id = last_ground_id.into_inner();
    authorized(
        &state.resolver,
        &token,
        MSG_LAST_GROUND_UPDATED,
        move |user| async move {
            let ground_id: i32 = raw_id
                .parse()
                .map_err(|_| DomainError::bad_input("그라운드 ID가 올바르지 않습니다"))?;
            directory.update_last_ground(&user, ground_id).await?;
            Ok(None)
        },
    )
    .await
}

/// Delete the caller's profile image.
#[utoipa::path(
    delete,
    path = "/user/profile",
    responses(
        (status = 200, description = "프로필 사진 삭제 성공", body = Envelope<User>),
        (status = 400, description = "파일 저장 에러"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "deleteProfile"
)]
#[delete("/profile")]
pub async fn delete_profile(state: web::Data<HttpState>, token: AccessToken) -> Envelope<User> {
    let profiles = state.profiles.clone();
    authorized(
        &state.resolver,
        &token,
        MSG_PROFILE_DELETED,
        move |user| async move {
            profiles.delete(&user).await?;
            Ok(user)
        },
    )
    .await
}

/// Unlink the GitHub grant and remove the caller's account.
#[utoipa::path(
    delete,
    path = "/user",
    params(("code" = String, Query, description = "GitHub OAuth 인가 코드")),
    responses(
        (status = 200, description = "사용자 탈퇴 성공", body = Envelope<Option<String>>),
        (status = 400, description = "잘못된 요청"),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "deleteUser"
)]
#[delete("")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    token: AccessToken,
    query: web::Query<DeleteUserQuery>,
) -> Envelope<Option<String>> {
    let directory = state.directory.clone();
    let github = state.github.clone();
    let code = query.into_inner().code;
    authorized(&state.resolver, &token, MSG_USER_DELETED, move |user| async move {
        let code = code
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| DomainError::bad_input("code 파라미터가 없습니다"))?;
        let access_token = github.exchange_code(&code).await?;
        github.revoke(&access_token).await?;
        directory.remove_user(&user).await?;
        Ok(None)
    })
    .await
}

/// Clear the caller's status message.
#[utoipa::path(
    delete,
    path = "/user/status-msg",
    responses(
        (status = 200, description = "상태메시지 삭제 성공", body = Envelope<User>),
        (status = 401, description = "access token 오류"),
        (status = 406, description = "존재하지 않는 사용자"),
        (status = 500, description = "내부 오류")
    ),
    tags = ["user"],
    operation_id = "deleteStatusMsg"
)]
#[delete("/status-msg")]
pub async fn delete_status_msg(state: web::Data<HttpState>, token: AccessToken) -> Envelope<User> {
    let directory = state.directory.clone();
    authorized(
        &state.resolver,
        &token,
        MSG_STATUS_MSG_DELETED,
        move |user| async move { Ok(directory.clear_status_msg(&user).await?) },
    )
    .await
}

/// Drain a multipart payload into a profile image, insisting on a `file`
/// part. Every failure is `BadInput` so broken uploads answer with 400.
async fn read_profile_upload(mut payload: Multipart) -> Result<ProfileImage, DomainError> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|error| DomainError::bad_input(format!("파일 저장 에러: {error}")))?;

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_owned);
        if name.as_deref() != Some("file") {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("profile")
            .to_owned();
        let content_type = field
            .content_type()
            .map(ToString::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_owned());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|error| DomainError::bad_input(format!("파일 저장 에러: {error}")))?;
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(DomainError::bad_input(
                    "파일 저장 에러: 파일이 너무 큽니다 (최대 5MB)",
                ));
            }
            data.extend_from_slice(&chunk);
        }
        if data.is_empty() {
            return Err(DomainError::bad_input("파일 저장 에러: 빈 파일입니다"));
        }

        return Ok(ProfileImage {
            file_name,
            content_type,
            data,
        });
    }
    Err(DomainError::bad_input("파일 저장 에러: file 파트가 없습니다"))
}
