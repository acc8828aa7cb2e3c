//! End-to-end chat flows against the in-process backend emulator

use std::sync::Arc;
use std::time::Duration;

use hearth_backend::{Emulator, SeedAccount, SeedData};
use hearth_client::{
    ChatClient, ClientConfig, ClientError, CredentialForm, FormMode, MISSING_CREDENTIALS,
    RecordingSurface, Region, SIGNUP_SUCCEEDED,
};
use hearth_core::{DocId, ProfileRecord, StoreError, USERS_COLLECTION};

const WAIT: Duration = Duration::from_secs(2);

struct Fixture {
    emulator: Emulator,
    surface: Arc<RecordingSurface>,
    client: ChatClient,
}

fn fixture(config: ClientConfig) -> Fixture {
    hearth_logging::init_testing();

    let emulator = Emulator::new();
    let surface = Arc::new(RecordingSurface::new());
    let client = ChatClient::new(
        emulator.identity.clone(),
        Arc::new(emulator.store.clone()),
        surface.clone(),
        config,
    );
    client.start();
    Fixture {
        emulator,
        surface,
        client,
    }
}

async fn wait_for_region(surface: &RecordingSurface, region: Region) -> bool {
    tokio::time::timeout(WAIT, async {
        while surface.region() != Some(region) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

#[tokio::test]
async fn signup_then_messages_render_with_display_name() {
    let f = fixture(ClientConfig::default());
    assert!(wait_for_region(&f.surface, Region::Login).await);

    assert_eq!(f.client.toggle_form_mode(), FormMode::Signup);
    let mut form = CredentialForm::new("a@x.com", "pw1").with_display_name("Ann");
    let user = f.client.submit(&mut form).await.unwrap();
    assert_eq!(f.surface.last_alert().as_deref(), Some(SIGNUP_SUCCEEDED));

    let profile: ProfileRecord = f
        .emulator
        .store
        .get(USERS_COLLECTION, &DocId::new(user.uid.as_str()))
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!(profile.email.as_str(), "a@x.com");
    assert_eq!(profile.display_name, "Ann");

    // Account creation signs the new account in
    assert!(wait_for_region(&f.surface, Region::Chat).await);

    let mut input = "hi".to_string();
    f.client.send(&mut input).unwrap();
    assert!(input.is_empty());

    assert!(f.surface.wait_for_lines(&["Ann: hi"], WAIT).await);
    f.client.shutdown().await;
}

#[tokio::test]
async fn two_messages_render_in_send_order() {
    let f = fixture(ClientConfig::default());
    f.emulator
        .seed(
            &SeedData {
                accounts: vec![SeedAccount {
                    email: "a@x.com".into(),
                    password: "pw1".into(),
                    display_name: Some("Ann".into()),
                }],
            },
            USERS_COLLECTION,
        )
        .await
        .unwrap();

    let mut form = CredentialForm::new("a@x.com", "pw1");
    f.client.login(&mut form).await.unwrap();
    assert!(form.email.is_empty() && form.password.is_empty());
    assert!(wait_for_region(&f.surface, Region::Chat).await);

    let first = f.client.send(&mut "hi".to_string()).unwrap().unwrap();
    let second = f.client.send(&mut "there".to_string()).unwrap().unwrap();
    first.confirmed().await.unwrap();
    second.confirmed().await.unwrap();

    assert!(f.surface.wait_for_lines(&["Ann: hi", "Ann: there"], WAIT).await);
    f.client.shutdown().await;
}

#[tokio::test]
async fn login_with_empty_password_makes_no_request() {
    let f = fixture(ClientConfig::default());

    let err = f
        .client
        .submit(&mut CredentialForm::new("a@x.com", ""))
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::Validation(MISSING_CREDENTIALS));
    assert_eq!(f.surface.last_alert().as_deref(), Some(MISSING_CREDENTIALS));
    assert_eq!(f.emulator.identity.request_count(), 0);
    f.client.shutdown().await;
}

#[tokio::test]
async fn profile_write_failure_leaves_orphaned_account() {
    let f = fixture(ClientConfig::default());
    f.emulator.store.fail_writes(
        USERS_COLLECTION,
        Some(StoreError::PermissionDenied("users".into())),
    );

    let form = CredentialForm::new("a@x.com", "pw1").with_display_name("Ann");
    let err = f.client.signup(&form).await.unwrap_err();

    assert!(matches!(err, ClientError::Signup { orphaned: Some(_), .. }));
    assert!(f.surface.last_alert().unwrap().starts_with("Signup failed: "));
    assert!(f.emulator.identity.account("a@x.com").is_some());
    f.client.shutdown().await;
}

#[tokio::test]
async fn logout_returns_to_login_and_stops_feed() {
    let f = fixture(ClientConfig::plain());
    f.emulator.identity.register("a@x.com", "pw1").unwrap();

    f.client
        .login(&mut CredentialForm::new("a@x.com", "pw1"))
        .await
        .unwrap();
    assert!(f.surface.wait_for_renders(1, WAIT).await);
    assert!(f.client.session().is_feed_live());

    f.client.logout().await.unwrap();
    assert!(wait_for_region(&f.surface, Region::Login).await);
    assert!(!f.client.session().is_feed_live());

    // Signed out: the composer refuses and keeps the input
    let mut input = "hi".to_string();
    assert_eq!(f.client.send(&mut input).unwrap_err(), ClientError::NotSignedIn);
    assert_eq!(input, "hi");
    f.client.shutdown().await;
}

#[tokio::test]
async fn plain_variant_renders_raw_email() {
    let f = fixture(ClientConfig::plain());

    f.client
        .signup(&CredentialForm::new("b@x.com", "pw1"))
        .await
        .unwrap();
    assert!(f.emulator.store.documents(USERS_COLLECTION).is_empty());
    assert!(wait_for_region(&f.surface, Region::Chat).await);

    f.client.send(&mut "yo".to_string()).unwrap();
    assert!(f.surface.wait_for_lines(&["b@x.com: yo"], WAIT).await);
    assert_eq!(f.emulator.store.read_count(USERS_COLLECTION), 0);
    f.client.shutdown().await;
}
