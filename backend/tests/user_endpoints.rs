//! End-to-end behaviour of the `/user` endpoints through real adapters.
//!
//! Runs the handlers against the in-memory directory, the JWT token lookup,
//! and a filesystem profile store in a temporary directory. Only the GitHub
//! gateway is stubbed.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::{App, test, web};
use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use rstest::rstest;
use serde_json::{Value, json};

use backend::domain::ports::{GithubGateway, GithubGatewayError};
use backend::domain::{AuthResolver, Ground, GroundMembership, Nickname, User};
use backend::inbound::http::HttpState;
use backend::inbound::http::users::{
    check_dup_nickname, delete_profile, delete_status_msg, delete_user, get_ground_list,
    get_status_msg, get_user_info, get_user_profile, save_personal_access_token,
    update_last_visited_ground, update_profile, update_user_info,
};
use backend::outbound::jwt::{AccessClaims, JwtTokenLookup};
use backend::outbound::memory::InMemoryDirectory;
use backend::outbound::profile::FsProfileImageStore;

const SECRET: &[u8] = b"integration-test-secret";

/// Gateway double accepting one known code and one known grant.
struct StubGithub;

#[async_trait]
impl GithubGateway for StubGithub {
    async fn exchange_code(&self, code: &str) -> Result<String, GithubGatewayError> {
        if code == "good-code" {
            Ok("gho_token".to_owned())
        } else {
            Err(GithubGatewayError::rejected("bad verification code"))
        }
    }

    async fn revoke(&self, access_token: &str) -> Result<(), GithubGatewayError> {
        if access_token == "gho_token" {
            Ok(())
        } else {
            Err(GithubGatewayError::rejected("unknown grant"))
        }
    }
}

fn fixture_user() -> User {
    User {
        id: 7,
        github_id: 583_231,
        nickname: Nickname::new("개발왕").expect("valid nickname"),
        status_msg: Some("열심히 개발 중".to_owned()),
        last_ground_id: None,
    }
}

fn mint_token(github_id: i64) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now + Duration::from_secs(600))
        .map(|deadline| deadline.as_secs() as usize)
        .expect("clock after epoch");
    let claims = AccessClaims {
        sub: github_id.to_string(),
        exp,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
        .expect("token encodes")
}

struct Harness {
    state: HttpState,
    // Keeps the profile directory alive for the test's duration.
    _profile_dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory::new());
    directory
        .insert_user(
            fixture_user(),
            vec![GroundMembership {
                is_owner: true,
                ground: Ground {
                    id: 11,
                    name: "메인 그라운드".to_owned(),
                },
            }],
        )
        .expect("seed ok");
    directory
        .insert_user(
            User {
                id: 8,
                github_id: 77,
                nickname: Nickname::new("점유된닉").expect("valid nickname"),
                status_msg: None,
                last_ground_id: None,
            },
            Vec::new(),
        )
        .expect("seed ok");

    let profile_dir = tempfile::tempdir().expect("tempdir");
    let profiles =
        FsProfileImageStore::new(profile_dir.path()).expect("profile store opens");
    let lookup = JwtTokenLookup::new(SECRET, directory.clone());

    Harness {
        state: HttpState::new(
            AuthResolver::new(Arc::new(lookup)),
            directory,
            Arc::new(profiles),
            Arc::new(StubGithub),
        ),
        _profile_dir: profile_dir,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new().app_data(web::Data::new($state)).service(
                web::scope("/user")
                    .service(get_user_info)
                    .service(get_user_profile)
                    .service(get_ground_list)
                    .service(get_status_msg)
                    .service(check_dup_nickname)
                    .service(save_personal_access_token)
                    .service(update_user_info)
                    .service(update_profile)
                    .service(update_last_visited_ground)
                    .service(delete_profile)
                    .service(delete_user)
                    .service(delete_status_msg),
            ),
        )
        .await
    };
}

async fn call(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    request: test::TestRequest,
) -> (u16, Value) {
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status().as_u16();
    let body: Value = test::read_body_json(response).await;
    (status, body)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn valid_token_fetches_the_user() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "사용자 정보 조회 성공");
    assert_eq!(body["data"]["id"], 7);
    assert_eq!(body["data"]["nickname"], "개발왕");
}

#[rstest]
#[case(None)]
#[case(Some("Bearer not-a-jwt"))]
#[case(Some("malformed-header"))]
#[actix_web::test]
async fn missing_or_invalid_tokens_answer_401(#[case] header: Option<&str>) {
    let app = init_app!(harness().state);

    let mut request = test::TestRequest::get().uri("/user");
    if let Some(value) = header {
        request = request.insert_header(("Authorization", value));
    }
    let (status, body) = call(&app, request).await;

    assert_eq!(status, 401);
    assert_eq!(body["status"], 401);
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn unknown_subject_answers_406() {
    let app = init_app!(harness().state);
    let token = mint_token(999_999);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, 406);
    assert_eq!(body["message"], "존재하지 않는 사용자입니다.");
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn ground_list_reports_memberships() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user/ground/list")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], "그라운드 목록 조회 성공!");
    assert_eq!(body["data"][0]["isOwner"], true);
    assert_eq!(body["data"][0]["ground"]["name"], "메인 그라운드");
}

#[rstest]
#[case("점유된닉", true)]
#[case("개발왕", false)]
#[case("자유닉", false)]
#[actix_web::test]
async fn nickname_duplicate_ignores_the_caller(#[case] nickname: &str, #[case] taken: bool) {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let encoded: String = nickname
        .bytes()
        .map(|b| format!("%{b:02X}"))
        .collect();
    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("/user/nickname/duplicate/{encoded}"))
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], "닉네임 중복 조회 성공!");
    assert_eq!(body["data"], taken);
}

#[actix_web::test]
async fn update_then_fetch_round_trips_the_change() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/user")
            .insert_header(bearer(&token))
            .set_json(json!({"nickname": "새닉네임", "statusMsg": "휴가 중"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "사용자 정보 수정 성공!");

    let (_, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body["data"]["nickname"], "새닉네임");
    assert_eq!(body["data"]["statusMsg"], "휴가 중");
}

#[actix_web::test]
async fn malformed_update_body_answers_400() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/user")
            .insert_header(bearer(&token))
            .set_payload("not json"),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn status_msg_lifecycle() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (_, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user/status-msg")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body["message"], "상태 메시지 조회 성공!");
    assert_eq!(body["data"], "열심히 개발 중");

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri("/user/status-msg")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);

    let (_, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user/status-msg")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["status"], 200);
}

fn multipart_payload(part_name: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{part_name}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (
        format!("multipart/form-data; boundary={boundary}"),
        body,
    )
}

#[actix_web::test]
async fn profile_image_upload_fetch_delete() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (content_type, payload) =
        multipart_payload("file", "avatar.png", &[0x89, b'P', b'N', b'G']);
    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/user/profile")
            .insert_header(bearer(&token))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "사용자 프로필 사진 수정 성공!");

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user/profile")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["contentType"], "image/png");
    // 0x89 "PNG" in base64.
    assert_eq!(body["data"]["content"], "iVBORw==");

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri("/user/profile")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user/profile")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 406);
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn upload_without_file_part_answers_400() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (content_type, payload) = multipart_payload("attachment", "avatar.png", b"data");
    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/user/profile")
            .insert_header(bearer(&token))
            .insert_header(("Content-Type", content_type))
            .set_payload(payload),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["status"], 400);
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn personal_access_token_save_rejects_blank_values() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/user/personal-access-token")
            .insert_header(bearer(&token))
            .set_json(json!({"personalAccessToken": "ghp_secret"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "personal access token 저장 성공!");
    assert_eq!(body["data"], Value::Null);

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/user/personal-access-token")
            .insert_header(bearer(&token))
            .set_json(json!({"personalAccessToken": "   "})),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn last_ground_update_validates_the_id() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/user/last-ground/11")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "사용자가 마지막으로 방문한 그라운드 수정 성공!");

    let (_, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body["data"]["lastGroundId"], 11);

    let (status, _) = call(
        &app,
        test::TestRequest::put()
            .uri("/user/last-ground/eleven")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn delete_user_requires_a_code_and_removes_the_account() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, body) = call(
        &app,
        test::TestRequest::delete()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "code 파라미터가 없습니다");

    let (status, body) = call(
        &app,
        test::TestRequest::delete()
            .uri("/user?code=good-code")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "사용자 탈퇴 성공!");

    let (status, _) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 406);
}

#[actix_web::test]
async fn rejected_oauth_code_answers_400_and_keeps_the_account() {
    let app = init_app!(harness().state);
    let token = mint_token(583_231);

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri("/user?code=stale-code")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        &app,
        test::TestRequest::get()
            .uri("/user")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);
}
