// tests/attempt_flow_tests.rs

use chrono::Utc;
use quizmaster::{config::Config, db, routes, state::AppState};
use sqlx::SqlitePool;

async fn spawn_app() -> (String, SqlitePool) {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "attempt_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: "admin".to_string(),
        admin_password: "admin".to_string(),
    };

    db::seed_admin(&pool, &config)
        .await
        .expect("Failed to seed admin user");

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    resp["token"].as_str().expect("Token not found").to_string()
}

/// Registers a regular user and returns their token.
async fn signup_user(client: &reqwest::Client, address: &str, username: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123",
            "name": "Quiz Taker"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status().as_u16(), 201);

    login(client, address, username, "password123").await
}

/// Builds subject -> chapter -> quiz as admin and returns the quiz id.
async fn seed_quiz(client: &reqwest::Client, address: &str, admin_token: &str, name: &str) -> i64 {
    let subject: serde_json::Value = client
        .post(format!("{}/api/admin/subjects", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "name": name,
            "description": "Seeded for tests"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let chapter: serde_json::Value = client
        .post(format!(
            "{}/api/admin/subjects/{}/chapters",
            address, subject["id"]
        ))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "name": format!("{} chapter", name),
            "description": "Seeded for tests"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let quiz: serde_json::Value = client
        .post(format!(
            "{}/api/admin/chapters/{}/quizzes",
            address, chapter["id"]
        ))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "date_of_quiz": "2026-09-01",
            "time_duration": 30,
            "remarks": "Seeded"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    quiz["id"].as_i64().unwrap()
}

/// Adds a four-option question to a quiz and returns its id.
async fn seed_question(
    client: &reqwest::Client,
    address: &str,
    admin_token: &str,
    quiz_id: i64,
    statement: &str,
    correct_option: i64,
) -> i64 {
    let question: serde_json::Value = client
        .post(format!("{}/api/admin/quizzes/{}/questions", address, quiz_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "statement": statement,
            "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
            "correct_option": correct_option
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    question["id"].as_i64().unwrap()
}

fn answers(entries: &[(i64, &str)]) -> serde_json::Value {
    let map: std::collections::HashMap<String, String> = entries
        .iter()
        .map(|(id, v)| (id.to_string(), v.to_string()))
        .collect();
    serde_json::json!({ "answers": map })
}

async fn score_rows(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn full_attempt_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Geography").await;

    // Correct options are [2, 3, 1].
    let q1 = seed_question(&client, &address, &admin_token, quiz_id, "First", 2).await;
    let q2 = seed_question(&client, &address, &admin_token, quiz_id, "Second", 3).await;
    let q3 = seed_question(&client, &address, &admin_token, quiz_id, "Third", 1).await;

    let user_token = signup_user(&client, &address, "taker").await;

    // Begin the attempt: questions in creation order, deadline present,
    // answer key absent.
    let view: serde_json::Value = client
        .get(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let questions = view["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(
        questions.iter().map(|q| q["id"].as_i64().unwrap()).collect::<Vec<_>>(),
        vec![q1, q2, q3]
    );
    for q in questions {
        assert!(q.get("correct_option").is_none());
        assert_eq!(q["options"].as_array().unwrap().len(), 4);
    }

    let deadline = chrono::DateTime::parse_from_rfc3339(view["deadline"].as_str().unwrap())
        .expect("deadline should be RFC 3339")
        .with_timezone(&Utc);
    assert!(deadline > Utc::now());

    // Two of three correct: floor(100 * 2 / 3) = 66.
    let result: serde_json::Value = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&answers(&[(q1, "2"), (q2, "4"), (q3, "1")]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["total_score"], 66);
    assert_eq!(result["correct_count"], 2);
    assert_eq!(result["total_questions"], 3);

    // Submitting again writes a second, independent score row.
    let resp = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&answers(&[(q1, "2"), (q2, "4"), (q3, "1")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(score_rows(&pool).await, 2);

    // Score history shows both attempts and only this user's rows.
    let scores: Vec<serde_json::Value> = client
        .get(format!("{}/api/scores", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(scores.len(), 2);
    assert!(scores.iter().all(|s| s["total_score"] == 66));

    // The admin has taken nothing.
    let scores: Vec<serde_json::Value> = client
        .get(format!("{}/api/scores", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(scores.is_empty());
}

#[tokio::test]
async fn unanswered_questions_count_as_incorrect() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Chemistry").await;
    let q1 = seed_question(&client, &address, &admin_token, quiz_id, "First", 1).await;
    seed_question(&client, &address, &admin_token, quiz_id, "Second", 2).await;

    let user_token = signup_user(&client, &address, "partial").await;

    let result: serde_json::Value = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&answers(&[(q1, "1")]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["total_score"], 50);

    // An entirely empty submission is graded, not rejected.
    let result: serde_json::Value = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({ "answers": {} }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["total_score"], 0);
}

#[tokio::test]
async fn unparsable_answer_writes_no_score() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Biology").await;
    let q1 = seed_question(&client, &address, &admin_token, quiz_id, "First", 1).await;
    let q2 = seed_question(&client, &address, &admin_token, quiz_id, "Second", 2).await;

    let user_token = signup_user(&client, &address, "sloppy").await;

    let resp = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&answers(&[(q1, "1"), (q2, "banana")]))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Something went wrong");

    assert_eq!(score_rows(&pool).await, 0);
}

#[tokio::test]
async fn empty_quiz_grades_to_zero() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Empty").await;

    let user_token = signup_user(&client, &address, "keen").await;

    let result: serde_json::Value = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({ "answers": {} }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["total_score"], 0);
    assert_eq!(result["total_questions"], 0);
    assert_eq!(score_rows(&pool).await, 1);
}

#[tokio::test]
async fn attempt_on_missing_quiz_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let user_token = signup_user(&client, &address, "lost").await;

    let resp = client
        .get(format!("{}/api/quizzes/424242/attempt", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = client
        .post(format!("{}/api/quizzes/424242/attempt", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn summary_aggregates_score_history() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Statistics").await;

    let user_token = signup_user(&client, &address, "grinder").await;

    // Empty history is all zeros, not an error.
    let summary: serde_json::Value = client
        .get(format!("{}/api/scores/summary", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["count"], 0);
    assert_eq!(summary["max"], 0);
    assert_eq!(summary["average"], 0.0);

    // Seed three attempts directly.
    let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = 'grinder'")
        .fetch_one(&pool)
        .await
        .unwrap();

    for total in [40i64, 80, 60] {
        sqlx::query(
            "INSERT INTO scores (quiz_id, user_id, time_stamp_of_attempt, total_score) VALUES (?, ?, ?, ?)",
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(Utc::now())
        .bind(total)
        .execute(&pool)
        .await
        .unwrap();
    }

    let summary: serde_json::Value = client
        .get(format!("{}/api/scores/summary", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["max"], 80);
    assert_eq!(summary["average"], 60.0);
}

#[tokio::test]
async fn deleting_subject_cascades_to_scores() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &address, "admin", "admin").await;
    let quiz_id = seed_quiz(&client, &address, &admin_token, "Doomed").await;
    let q1 = seed_question(&client, &address, &admin_token, quiz_id, "First", 1).await;

    let user_token = signup_user(&client, &address, "victim").await;

    let resp = client
        .post(format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&answers(&[(q1, "1")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(score_rows(&pool).await, 1);

    let subject_id = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE name = 'Doomed'")
        .fetch_one(&pool)
        .await
        .unwrap();

    let resp = client
        .delete(format!("{}/api/admin/subjects/{}", address, subject_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    // The whole tree beneath the subject is gone.
    for table in ["chapters", "quizzes", "questions", "scores"] {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "table {} should be empty", table);
    }

    // The user survives; only their scores are gone.
    let scores: Vec<serde_json::Value> = client
        .get(format!("{}/api/scores", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(scores.is_empty());
}
