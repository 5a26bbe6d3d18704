use std::time::Duration;

use api_types::{
    filter::Filters,
    place::PlacePayload,
    visit::VisitPayload,
};
use chrono::NaiveDate;
use voyager_tui::{
    app::{App, Load, Screen},
    client::{Client, ClientError},
    config::AppConfig,
    ui::keymap::AppAction,
};

async fn spawn_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = mock_server::spawn_with_listener(listener).unwrap();
    format!("http://{addr}")
}

async fn client() -> Client {
    Client::new(&spawn_backend().await, reqwest::Client::new()).unwrap()
}

fn named(name: &str) -> PlacePayload {
    PlacePayload {
        name: Some(name.to_string()),
        ..PlacePayload::default()
    }
}

fn visit_payload() -> VisitPayload {
    VisitPayload {
        visit_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        rating: Some(4),
        notes: Some("Great".to_string()),
    }
}

#[tokio::test]
async fn created_place_reports_its_cost_label() {
    let client = client().await;
    let created = client
        .create_place(&PlacePayload {
            cost: Some(1),
            ..named("Cafe X")
        })
        .await
        .unwrap();

    let fetched = client.get_place(created.id).await.unwrap();
    assert_eq!(fetched.name, "Cafe X");
    assert_eq!(fetched.cost_label(), "£");
}

#[tokio::test]
async fn added_visit_shows_up_on_reload() {
    let client = client().await;
    let place = client.create_place(&named("Louvre")).await.unwrap();
    client.add_visit(place.id, &visit_payload()).await.unwrap();

    let reloaded = client.get_place(place.id).await.unwrap();
    assert_eq!(reloaded.visits.len(), 1);
    let visit = &reloaded.visits[0];
    assert_eq!(visit.visit_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(visit.rating, Some(4));
    assert_eq!(visit.notes.as_deref(), Some("Great"));
}

#[tokio::test]
async fn deleted_visit_is_gone_on_reload() {
    let client = client().await;
    let place = client.create_place(&named("Park")).await.unwrap();
    let visit = client.add_visit(place.id, &visit_payload()).await.unwrap();

    client.delete_visit(visit.id).await.unwrap();
    let reloaded = client.get_place(place.id).await.unwrap();
    assert!(reloaded.visits.is_empty());
}

#[tokio::test]
async fn visit_update_can_clear_rating() {
    let client = client().await;
    let place = client.create_place(&named("Museum")).await.unwrap();
    let visit = client.add_visit(place.id, &visit_payload()).await.unwrap();

    let updated = client
        .update_visit(
            visit.id,
            &VisitPayload {
                rating: None,
                ..visit_payload()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.rating, None);
    assert_eq!(updated.notes.as_deref(), Some("Great"));
}

#[tokio::test]
async fn filters_narrow_the_list() {
    let client = client().await;
    client
        .create_place(&PlacePayload {
            tags: Some(vec!["food".to_string()]),
            cost: Some(3),
            ..named("Steakhouse")
        })
        .await
        .unwrap();
    client
        .create_place(&PlacePayload {
            tags: Some(vec!["park".to_string()]),
            cost: Some(0),
            ..named("Hyde Park")
        })
        .await
        .unwrap();

    let all = client.list_places(&Filters::initial()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Hyde Park");

    let cheap = client
        .list_places(&Filters {
            max_cost: Some(1),
            ..Filters::initial()
        })
        .await
        .unwrap();
    assert_eq!(cheap.len(), 1);
    assert_eq!(cheap[0].name, "Hyde Park");

    let tagged = client
        .list_places(&Filters {
            tags: vec!["food".to_string()],
            ..Filters::default()
        })
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].name, "Steakhouse");

    let tags = client.list_tags().await.unwrap();
    assert_eq!(tags, vec!["food".to_string(), "park".to_string()]);
}

#[tokio::test]
async fn server_errors_carry_status_and_detail() {
    let client = client().await;

    assert!(matches!(
        client.get_place(999).await,
        Err(ClientError::NotFound)
    ));

    let err = client
        .create_place(&PlacePayload {
            cost: Some(7),
            ..named("Too dear")
        })
        .await
        .unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(message, "cost must be between 0 and 3");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = client
        .list_places(&Filters {
            distance_from: Some("north".to_string()),
            ..Filters::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status, .. } if status.as_u16() == 400));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(&format!("http://{addr}"), reqwest::Client::new()).unwrap();
    assert!(matches!(
        client.list_tags().await,
        Err(ClientError::Transport(_))
    ));
}

// App-level flows, driven through actions and applied outcomes.

async fn app() -> (App, Client) {
    let base_url = spawn_backend().await;
    let config = AppConfig {
        base_url: base_url.clone(),
        ..AppConfig::default()
    };
    let app = App::new(config).unwrap();
    let client = Client::new(&base_url, reqwest::Client::new()).unwrap();
    (app, client)
}

async fn settle_until(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..20 {
        if done(app) {
            return;
        }
        tokio::time::timeout(Duration::from_secs(5), app.settle())
            .await
            .expect("background request timed out");
    }
    panic!("app never reached the expected state");
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_action(AppAction::Input(ch));
    }
}

fn detail_visits(app: &App) -> Option<usize> {
    let page = app.state.detail.as_ref()?;
    page.place.loaded().map(|place| place.visits.len())
}

#[tokio::test]
async fn place_and_visit_lifecycle_through_the_app() {
    let (mut app, client) = app().await;
    app.start();
    settle_until(&mut app, |app| {
        matches!(&app.state.list.places, Load::Loaded(places) if places.is_empty())
    })
    .await;

    app.handle_action(AppAction::Input('n'));
    assert_eq!(app.state.screen, Screen::NewPlace);
    type_text(&mut app, "Cafe X");
    for _ in 0..4 {
        app.handle_action(AppAction::NextField);
    }
    app.handle_action(AppAction::Right);
    app.handle_action(AppAction::Submit);

    settle_until(&mut app, |app| {
        matches!(app.state.screen, Screen::Detail(_)) && detail_visits(app).is_some()
    })
    .await;
    let place = app
        .state
        .detail
        .as_ref()
        .and_then(|page| page.place.loaded())
        .cloned()
        .unwrap();
    assert_eq!(place.name, "Cafe X");
    assert_eq!(place.cost_label(), "£");

    app.handle_action(AppAction::Input('a'));
    for _ in 0..10 {
        app.handle_action(AppAction::Backspace);
    }
    type_text(&mut app, "2024-01-05");
    app.handle_action(AppAction::NextField);
    type_text(&mut app, "4");
    app.handle_action(AppAction::NextField);
    type_text(&mut app, "Great");
    app.handle_action(AppAction::Submit);

    settle_until(&mut app, |app| detail_visits(app) == Some(1)).await;
    let page = app.state.detail.as_ref().unwrap();
    assert!(page.new_visit.is_none());
    assert_eq!(page.visits[0].visit.rating, Some(4));
    assert_eq!(page.visits[0].visit.notes.as_deref(), Some("Great"));

    app.handle_action(AppAction::Input('x'));
    app.handle_action(AppAction::Input('y'));
    settle_until(&mut app, |app| detail_visits(app) == Some(0)).await;

    app.handle_action(AppAction::Input('D'));
    app.handle_action(AppAction::Input('y'));
    settle_until(&mut app, |app| {
        app.state.screen == Screen::List
            && matches!(&app.state.list.places, Load::Loaded(places) if places.is_empty())
    })
    .await;
    assert!(matches!(
        client.get_place(place.id).await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn empty_name_never_reaches_the_server() {
    let (mut app, client) = app().await;
    app.handle_action(AppAction::Input('n'));
    type_text(&mut app, "   ");
    app.handle_action(AppAction::Submit);

    let form = app
        .state
        .form
        .as_ref()
        .and_then(|page| page.form.loaded())
        .unwrap();
    assert_eq!(form.status.error(), Some("Name is required"));
    assert!(client.list_places(&Filters::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_latest_search_is_applied() {
    let (mut app, client) = app().await;
    client.create_place(&named("Zoo")).await.unwrap();
    client.create_place(&named("Aquarium")).await.unwrap();

    app.handle_action(AppAction::Input('/'));
    type_text(&mut app, "zoo");
    assert_eq!(app.state.list.filters.text_search.as_deref(), Some("zoo"));

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(5), app.settle())
            .await
            .unwrap();
    }
    let places = app.state.list.places.loaded().unwrap();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].name, "Zoo");
}
