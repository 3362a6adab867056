//! Panel controller and session tests
//!
//! Change filtering, forced resyncs, result delivery and the single-panel lifecycle.

mod common;

use common::{edit, prql_editor, resource_root, MockHost, MockPanel, RecordingScheduler};
use prql_preview::config::PreviewConfig;
use prql_preview::editor::{EditorState, TextDocument};
use prql_preview::panel::{PanelEvent, PanelPhase, Placement, PreviewSession};
use prql_preview::syntax::LanguageId;
use prql_preview::template::ResourceRoot;
use prql_preview::worker::{CompileJob, CompileOutcome, PanelId};
use prql_preview::CompilationResult;

type Session = PreviewSession<MockPanel, RecordingScheduler>;

fn session() -> Session {
    PreviewSession::new(RecordingScheduler::default(), resource_root())
}

fn open(session: &mut Session, host: &mut MockHost, editor: &EditorState) {
    session.open_panel(host, editor).unwrap();
}

fn jobs(session: &Session) -> &[CompileJob] {
    &session.scheduler().jobs
}

fn outcome(job: &CompileJob, content: &str) -> CompileOutcome {
    CompileOutcome {
        panel: job.panel,
        seq: job.seq,
        result: CompilationResult::Ok(content.to_string()),
    }
}

// ========================================================================
// Panel creation
// ========================================================================

#[test]
fn test_open_loads_template_with_resolved_tokens() {
    let mut session = session();
    let mut host = MockHost::default();
    open(&mut session, &mut host, &EditorState::new());

    let html = session.panel().unwrap().panel().html.clone().unwrap();
    assert!(html.contains("mock://assets/sql_output.js"));
    assert!(html.contains("mock://assets/sql_output.css"));
    assert!(html.contains("style-src mock:"));
    assert!(!html.contains("##"));
}

#[test]
fn test_open_uses_sql_output_options() {
    let mut session = session();
    let mut host = MockHost::default();
    open(&mut session, &mut host, &EditorState::new());

    let options = &host.options[0];
    assert_eq!(options.title, "PRQL - SQL Output");
    assert_eq!(options.placement, Placement::Beside);
    assert!(options.preserve_focus);
    assert!(options.enable_scripts);
    assert!(!options.enable_find_widget);
    assert_eq!(options.resource_root, resource_root());
}

#[test]
fn test_open_with_prql_active_compiles_immediately() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    assert_eq!(jobs(&session).len(), 1);
    assert_eq!(jobs(&session)[0].source, "from employees");
    assert_eq!(session.panel().unwrap().previous_text(), "from employees");
}

#[test]
fn test_open_without_active_editor_does_nothing() {
    let mut session = session();
    let mut host = MockHost::default();
    open(&mut session, &mut host, &EditorState::new());

    assert!(jobs(&session).is_empty());
    assert_eq!(session.panel().unwrap().phase(), PanelPhase::Active);
}

#[test]
fn test_missing_template_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut session: Session =
        PreviewSession::new(RecordingScheduler::default(), ResourceRoot::new(dir.path()));
    let mut host = MockHost::default();

    assert!(session.open_panel(&mut host, &EditorState::new()).is_err());
    assert!(!session.has_panel());
}

#[test]
fn test_host_failure_fails_open() {
    let mut session = session();
    let mut host = MockHost {
        fail: true,
        ..Default::default()
    };
    assert!(session.open_panel(&mut host, &EditorState::new()).is_err());
    assert!(!session.has_panel());
}

// ========================================================================
// Change filter
// ========================================================================

#[test]
fn test_unchanged_text_does_not_recompile() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    assert!(!session.handle_event(PanelEvent::DocumentChanged, &editor));
    assert!(!session.handle_event(PanelEvent::ActiveEditorChanged, &editor));
    assert_eq!(jobs(&session).len(), 1);
}

#[test]
fn test_changed_text_compiles_once() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    edit(&mut editor, "from employees | take 10");
    assert!(session.handle_event(PanelEvent::DocumentChanged, &editor));

    assert_eq!(jobs(&session).len(), 2);
    assert_eq!(jobs(&session)[1].source, "from employees | take 10");
    assert!(jobs(&session)[1].seq > jobs(&session)[0].seq);
    assert_eq!(
        session.panel().unwrap().previous_text(),
        "from employees | take 10"
    );
}

#[test]
fn test_hidden_panel_does_not_compile() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);
    session.panel_mut().unwrap().panel_mut().visible = false;

    edit(&mut editor, "from b");
    assert!(!session.handle_event(PanelEvent::DocumentChanged, &editor));
    assert_eq!(session.panel().unwrap().previous_text(), "from a");
}

#[test]
fn test_non_prql_editor_does_not_compile() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);

    editor.open(TextDocument::new("file:///out.sql", LanguageId::Sql, "SELECT 1"));
    editor.activate(Some("file:///out.sql".to_string()));
    assert!(!session.handle_event(PanelEvent::ActiveEditorChanged, &editor));
    assert_eq!(jobs(&session).len(), 1);
}

#[test]
fn test_switching_between_prql_documents_compiles_new_text() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);

    editor.open(TextDocument::new("file:///other.prql", LanguageId::Prql, "from b"));
    editor.activate(Some("file:///other.prql".to_string()));
    assert!(session.handle_event(PanelEvent::ActiveEditorChanged, &editor));
    assert_eq!(jobs(&session).last().unwrap().source, "from b");
}

// ========================================================================
// Forced resync on configuration change
// ========================================================================

#[test]
fn test_configuration_change_reconfigures_then_forces_compile() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    let config = PreviewConfig {
        color_theme: Some("GitHub Light".to_string()),
        ..Default::default()
    };
    assert!(session.reconfigure(config.clone(), &editor));

    assert_eq!(session.scheduler().reconfigured, vec![config]);
    assert_eq!(jobs(&session).len(), 2);
    assert_eq!(jobs(&session)[1].source, "from employees");
}

#[test]
fn test_forced_resync_ignores_visibility_and_document_type() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    session.panel_mut().unwrap().panel_mut().visible = false;
    editor.activate(None);

    assert!(session.reconfigure(PreviewConfig::default(), &editor));
    assert_eq!(jobs(&session).len(), 2);
    assert_eq!(jobs(&session)[1].source, "from employees");
}

#[test]
fn test_forced_resync_before_any_text_compiles_empty_source() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = EditorState::new();
    open(&mut session, &mut host, &editor);

    assert!(session.reconfigure(PreviewConfig::default(), &editor));
    assert_eq!(jobs(&session)[0].source, "");
}

#[test]
fn test_configuration_without_panel_still_reconfigures() {
    let mut session = session();
    let editor = prql_editor("from employees");

    assert!(!session.reconfigure(PreviewConfig::default(), &editor));
    assert_eq!(session.scheduler().reconfigured.len(), 1);
    assert!(jobs(&session).is_empty());
}

// ========================================================================
// Result delivery
// ========================================================================

#[test]
fn test_outcome_is_posted() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from employees");
    open(&mut session, &mut host, &editor);

    let job = jobs(&session)[0].clone();
    assert!(session.deliver(outcome(&job, "<pre>SELECT</pre>")));
    assert_eq!(
        session.panel().unwrap().panel().posts,
        vec![CompilationResult::Ok("<pre>SELECT</pre>".to_string())]
    );
}

#[test]
fn test_stale_outcome_is_dropped() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);
    edit(&mut editor, "from b");
    session.handle_event(PanelEvent::DocumentChanged, &editor);

    let first = jobs(&session)[0].clone();
    let second = jobs(&session)[1].clone();

    assert!(session.deliver(outcome(&second, "b")));
    assert!(!session.deliver(outcome(&first, "a")));
    assert!(!session.deliver(outcome(&second, "b again")));

    let posts = &session.panel().unwrap().panel().posts;
    assert_eq!(posts, &vec![CompilationResult::Ok("b".to_string())]);
}

#[test]
fn test_outcome_for_other_panel_is_dropped() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);

    let foreign = CompileOutcome {
        panel: PanelId(999),
        seq: 1,
        result: CompilationResult::Ok("x".to_string()),
    };
    assert!(!session.deliver(foreign));
    assert!(session.panel().unwrap().panel().posts.is_empty());
}

#[test]
fn test_outcome_without_panel_is_dropped() {
    let mut session = session();
    let job = CompileJob {
        panel: PanelId(1),
        seq: 1,
        source: String::new(),
    };
    assert!(!session.deliver(outcome(&job, "x")));
}

// ========================================================================
// Lifecycle
// ========================================================================

#[test]
fn test_second_open_reveals_existing_panel() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = EditorState::new();
    open(&mut session, &mut host, &editor);
    open(&mut session, &mut host, &editor);

    assert_eq!(host.created, 1);
    let reveals = &session.panel().unwrap().panel().reveals;
    assert_eq!(reveals.len(), 1);
    // Revealing takes focus, at the panel's last placement
    assert_eq!(reveals[0], (Some(Placement::At { x: 100, y: 50 }), false));
}

#[test]
fn test_dispose_then_open_creates_fresh_panel() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);
    let first_id = session.panel().unwrap().id();

    session.panel_disposed();
    assert!(!session.has_panel());
    assert_eq!(
        session.last_placement(),
        Some(Placement::At { x: 100, y: 50 })
    );

    open(&mut session, &mut host, &editor);
    assert_eq!(host.created, 2);
    let second = session.panel().unwrap();
    assert_ne!(second.id(), first_id);
    // The fresh panel starts with empty previous text and compiles again
    assert_eq!(jobs(&session).len(), 2);
    assert_eq!(jobs(&session)[1].panel, second.id());
}

#[test]
fn test_outcome_for_disposed_panel_is_dropped_by_new_panel() {
    let mut session = session();
    let mut host = MockHost::default();
    let editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);
    let old_job = jobs(&session)[0].clone();

    session.panel_disposed();
    open(&mut session, &mut host, &editor);

    assert!(!session.deliver(outcome(&old_job, "old")));
    assert!(session.panel().unwrap().panel().posts.is_empty());
}

#[test]
fn test_events_after_dispose_are_ignored() {
    let mut session = session();
    let mut host = MockHost::default();
    let mut editor = prql_editor("from a");
    open(&mut session, &mut host, &editor);
    session.panel_disposed();

    edit(&mut editor, "from b");
    assert!(!session.handle_event(PanelEvent::DocumentChanged, &editor));
    assert_eq!(jobs(&session).len(), 1);
}

#[test]
fn test_panel_moved_updates_placement() {
    let mut session = session();
    session.panel_moved(Placement::At { x: 7, y: 9 });
    assert_eq!(session.last_placement(), Some(Placement::At { x: 7, y: 9 }));
}
