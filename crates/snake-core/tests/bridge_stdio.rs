use std::io::Cursor;

use serde_json::Value;
use snake_core::{rpc, GameSession, HighScores, Response, SessionConfig};

fn run(session: &mut GameSession, lines: &[&str]) -> Vec<Response> {
    let input = lines.join("\n");
    let mut output = Vec::new();
    rpc::serve(session, Cursor::new(input), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn full_round_over_stdio() {
    let mut session = GameSession::new(SessionConfig::default(), HighScores::in_memory());
    let responses = run(
        &mut session,
        &[
            r#"{"method":"snake_begin","params":{"width":12,"height":9}}"#,
            r#"{"method":"snake_turn","params":{"direction":"down"}}"#,
            r#"{"method":"snake_update","params":{"username":"ada"}}"#,
            r#"{"method":"snake_is_game_over"}"#,
            r#"{"method":"snake_length"}"#,
            r#"{"method":"get_objects"}"#,
            r#"{"method":"get_attributes"}"#,
            r#"{"method":"get_user_high_score","params":{"username":"ada"}}"#,
        ],
    );

    assert_eq!(responses.len(), 8);
    assert_eq!(responses[0], Response::Ok(Value::Null));
    assert_eq!(responses[3], Response::Ok(Value::Bool(false)));

    let Response::Ok(length) = &responses[4] else {
        panic!("length failed: {:?}", responses[4]);
    };
    let Response::Ok(objects) = &responses[5] else {
        panic!("objects failed: {:?}", responses[5]);
    };
    let objects = objects.as_object().unwrap();
    assert_eq!(objects.len(), 2);
    for object in objects.values() {
        assert!(object["gid"].is_array());
        assert!(object["body"].is_array());
    }

    let Response::Ok(attributes) = &responses[6] else {
        panic!("attributes failed: {:?}", responses[6]);
    };
    for group in attributes.as_object().unwrap().values() {
        assert!(group["priority-level"].is_i64());
    }

    assert_eq!(responses[7], Response::Ok(length.clone()));
}

#[test]
fn bad_lines_do_not_stop_the_server() {
    let mut session = GameSession::new(SessionConfig::default(), HighScores::in_memory());
    let responses = run(
        &mut session,
        &[
            "this is not json",
            r#"{"method":"no_such_method"}"#,
            r#"{"method":"snake_length"}"#,
            "",
            r#"{"method":"path_conjoin","params":{"parts":["json","canvas.json"]}}"#,
        ],
    );

    assert_eq!(responses.len(), 4);
    assert!(matches!(responses[0], Response::Error(_)));
    assert!(matches!(responses[1], Response::Error(_)));
    assert_eq!(responses[2], Response::Error("game not started".to_string()));
    let Response::Ok(Value::String(path)) = &responses[3] else {
        panic!("path_conjoin failed: {:?}", responses[3]);
    };
    assert!(path.ends_with("canvas.json"));
}

#[test]
fn oversized_board_is_refused_and_serving_continues() {
    let mut session = GameSession::new(SessionConfig::default(), HighScores::in_memory());
    let responses = run(
        &mut session,
        &[
            r#"{"method":"snake_begin","params":{"width":4294967296,"height":4294967296}}"#,
            r#"{"method":"snake_begin","params":{"width":2,"height":1}}"#,
            r#"{"method":"snake_begin","params":{"width":8,"height":8}}"#,
            r#"{"method":"snake_length"}"#,
        ],
    );

    assert_eq!(responses.len(), 4);
    assert!(matches!(&responses[0], Response::Error(msg) if msg.starts_with("invalid request")));
    assert!(matches!(&responses[1], Response::Error(_)));
    assert_eq!(responses[2], Response::Ok(Value::Null));
    assert_eq!(responses[3], Response::Ok(Value::from(3)));
}
