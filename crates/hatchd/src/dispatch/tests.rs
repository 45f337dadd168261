//! Routing and line handling tests.

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use super::*;
use crate::output::BufferSink;
use crate::tree::{CommandNode, TreeShape};

fn tokens(line: &str) -> Vec<String> {
    tokenize(line)
}

fn recording(name: &'static str) -> impl Fn(&dyn crate::OutputSink, &[String]) + Send + Sync {
    move |out, args| out.write_line(&format!("{name}({args:?})"))
}

/// `Foo{Bar,Baz}` plus `Config{Show,Filter{Level}}` with a `Config` fallback.
#[fixture]
fn dispatcher() -> Dispatcher {
    let shape = TreeShape::new()
        .node(CommandNode::new("Foo").leaf("Bar").leaf("Baz"))
        .node(
            CommandNode::new("Config")
                .leaf("Show")
                .child(CommandNode::new("Filter").leaf("Level")),
        )
        .leaf("Status");
    let handlers = HandlerSet::new()
        .with_args("FooBar", recording("FooBar"))
        .nullary("FooBaz", |out| out.write_line("FooBaz"))
        .with_args("Config", recording("Config"))
        .with_args("ConfigShow", recording("ConfigShow"))
        .with_args("ConfigFilterLevel", recording("ConfigFilterLevel"))
        .nullary("Status", |out| out.write_line("Status"));
    Dispatcher::build(&shape, handlers).expect("valid tree")
}

#[fixture]
fn sink() -> BufferSink {
    BufferSink::new()
}

#[rstest]
#[case::extra_args("foo bar extra args", "FooBar([\"extra\", \"args\"])\n")]
#[case::no_args("foo bar", "FooBar([])\n")]
#[case::mixed_case("FOO bAr", "FooBar([])\n")]
#[case::nullary_ignores_args("foo baz ignored", "FooBaz\n")]
#[case::deep_leaf("config filter level debug", "ConfigFilterLevel([\"debug\"])\n")]
#[case::group_alone("config", "Config([])\n")]
#[case::fallback_from_deeper_group("config filter nope", "Config([\"filter\", \"nope\"])\n")]
#[case::repeated_spaces_keep_empty_args("foo bar a  b", "FooBar([\"a\", \"\", \"b\"])\n")]
fn routes_to_single_handler(
    dispatcher: Dispatcher,
    sink: BufferSink,
    #[case] line: &str,
    #[case] expected: &str,
) {
    let outcome = dispatcher.dispatch(&tokens(line), &sink);
    assert_eq!(outcome, RouteOutcome::Executed);
    assert_eq!(sink.contents(), expected);
}

#[rstest]
#[case::unknown_child("foo qux")]
#[case::unknown_top_level("bogus")]
#[case::group_without_handler("foo")]
#[case::unknown_child_of_group_with_handler("config nope")]
#[case::double_space_between_names("foo  bar")]
fn reports_misses(dispatcher: Dispatcher, sink: BufferSink, #[case] line: &str) {
    let outcome = dispatcher.dispatch(&tokens(line), &sink);
    assert_eq!(outcome, RouteOutcome::NotExecuted);
    assert_eq!(sink.contents(), "");
}

#[rstest]
fn leaf_receives_unconsumed_tokens(sink: BufferSink) {
    let shape = TreeShape::new().leaf("Foo");
    let handlers = HandlerSet::new().with_args("Foo", recording("Foo"));
    let dispatcher = Dispatcher::build(&shape, handlers).expect("valid tree");

    let outcome = dispatcher.dispatch(&tokens("foo anything"), &sink);

    assert_eq!(outcome, RouteOutcome::Executed);
    assert_eq!(sink.contents(), "Foo([\"anything\"])\n");
}

#[rstest]
fn empty_token_list_is_not_routed(dispatcher: Dispatcher, sink: BufferSink) {
    assert_eq!(dispatcher.dispatch(&[], &sink), RouteOutcome::NotExecuted);
}

#[rstest]
fn help_lists_commands_depth_first() {
    let shape = TreeShape::new()
        .node(CommandNode::new("Status").describe("show console status"))
        .node(
            CommandNode::new("Config")
                .describe("inspect configuration")
                .child(CommandNode::new("Show").describe("print the loaded configuration"))
                .child(CommandNode::new("Filter").describe("print the log filter")),
        )
        .node(CommandNode::new("Echo").describe("repeat the arguments"));
    let handlers = HandlerSet::new()
        .nullary("Status", |_| {})
        .nullary("ConfigShow", |_| {})
        .nullary("ConfigFilter", |_| {})
        .with_args("Echo", |_, _| {});
    let dispatcher = Dispatcher::build(&shape, handlers).expect("valid tree");
    let sink = BufferSink::new();

    dispatcher.write_help(&sink);

    assert_snapshot!("help_listing", sink.contents());
}

#[rstest]
fn help_lines_without_description_keep_separator(dispatcher: Dispatcher, sink: BufferSink) {
    dispatcher.write_help(&sink);
    let contents = sink.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        [
            "foo \t",
            "foo bar \t",
            "foo baz \t",
            "config \t",
            "config show \t",
            "config filter \t",
            "config filter level \t",
            "status \t",
        ]
    );
}

#[rstest]
#[case::bare("exit")]
#[case::with_trailing_tokens("exit now please")]
#[case::padded("   exit  ")]
fn exit_ends_session_without_prompt(dispatcher: Dispatcher, sink: BufferSink, #[case] line: &str) {
    assert_eq!(handle_line(line, &dispatcher, &sink), LineOutcome::Exit);
    assert_eq!(sink.contents(), "");
}

#[rstest]
fn exit_is_case_sensitive(dispatcher: Dispatcher, sink: BufferSink) {
    assert_eq!(handle_line("EXIT", &dispatcher, &sink), LineOutcome::Continue);
    assert_eq!(sink.contents(), format!("{UNSUPPORTED_MESSAGE}\n{PROMPT}"));
}

#[rstest]
fn bare_help_bypasses_router(dispatcher: Dispatcher, sink: BufferSink) {
    assert_eq!(handle_line("help", &dispatcher, &sink), LineOutcome::Continue);
    let contents = sink.contents();
    assert!(contents.starts_with("foo \t\n"));
    assert!(contents.ends_with(PROMPT));
}

#[rstest]
fn help_with_arguments_is_routed(dispatcher: Dispatcher, sink: BufferSink) {
    handle_line("help foo", &dispatcher, &sink);
    assert_eq!(sink.contents(), format!("{UNSUPPORTED_MESSAGE}\n{PROMPT}"));
}

#[rstest]
#[case::empty("")]
#[case::whitespace(" \t ")]
fn blank_lines_only_prompt(dispatcher: Dispatcher, sink: BufferSink, #[case] line: &str) {
    assert_eq!(handle_line(line, &dispatcher, &sink), LineOutcome::Continue);
    assert_eq!(sink.contents(), PROMPT);
}

#[rstest]
fn one_prompt_per_processed_line(dispatcher: Dispatcher, sink: BufferSink) {
    for line in ["status", "bogus", "", "foo bar 1"] {
        handle_line(line, &dispatcher, &sink);
    }
    assert_eq!(sink.contents().matches(PROMPT).count(), 4);
    assert_eq!(
        sink.take(),
        format!("Status\n{PROMPT}{UNSUPPORTED_MESSAGE}\n{PROMPT}{PROMPT}FooBar([\"1\"])\n{PROMPT}")
    );
}
