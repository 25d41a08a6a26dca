use std::collections::BTreeSet;
use std::fs;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;
use todo_list::menu::{Menu, MenuOptions};
use todo_list::tui::app::App;
use todo_list::{Task, TaskStore};

// ============================================================================
// Helper Functions
// ============================================================================

fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Full-screen UI
// ============================================================================

#[test]
fn test_tui_session_persists_tasks_and_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"{"taskList": ["Meditate", "Wash dishes"], "selected": []}"#,
    )
    .unwrap();

    let mut store = TaskStore::load(&path, false).unwrap();
    let mut app = App::new(&mut store, false);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('o'));
    for c in "Drink tea".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    assert!(press(&mut app, KeyCode::Esc));

    let doc = read_json(&path);
    let names: Vec<&str> = doc["taskList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Meditate", "Wash dishes", "Drink tea"]);
    assert!(doc["taskList"].as_array().unwrap().iter().all(|t| t["isDone"] == false));
    assert_eq!(doc["selected"], serde_json::json!([0]));
}

#[test]
fn test_tui_delete_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let tasks = ["a", "b", "c"].iter().map(|n| Task::new(*n)).collect();
    let mut store = TaskStore::from_parts(&path, tasks, [0, 2].into_iter().collect());

    let mut app = App::new(&mut store, false);
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('d'));
    assert!(press(&mut app, KeyCode::Char('q')));

    let reloaded = TaskStore::load(&path, false).unwrap();
    let names: Vec<&str> = reloaded.tasks().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(reloaded.selected(), &[0, 1].into_iter().collect::<BTreeSet<_>>());
}

// ============================================================================
// Numbered menu
// ============================================================================

#[test]
fn test_menu_reads_legacy_file_and_writes_current_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, r#"[{"name": "Meditate", "isDone": false}]"#).unwrap();

    let mut store = TaskStore::load(&path, false).unwrap();
    let mut out = Vec::new();
    let options = MenuOptions { clear_screen: false, confirm_delete: false };
    Menu::new(&mut store, "1\n1\n2\nWash dishes\n5\n".as_bytes(), &mut out, options)
        .run()
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("Yayy you've finished").count(), 1);

    let doc = read_json(&path);
    assert_eq!(doc["taskList"][0]["name"], "Meditate");
    assert_eq!(doc["taskList"][0]["isDone"], true);
    assert_eq!(doc["taskList"][1]["name"], "Wash dishes");
    assert_eq!(doc["taskList"][1]["isDone"], false);
}

#[test]
fn test_corrupt_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "not json").unwrap();
    let err = TaskStore::load(&path, false).unwrap_err();
    assert!(err.to_string().starts_with("task file is not valid"));
}
