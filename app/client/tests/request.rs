//! Request construction tests.

use manta_client::{PathError, Request};
use server::Command;

fn root() -> Command {
    Command::group()
        .subcommand("version", Command::new(|_ctx| async { Ok(()) }))
        .subcommand(
            "repo",
            Command::group().subcommand("stat", Command::new(|_ctx| async { Ok(()) })),
        )
}

#[test]
fn build_validates_against_the_table() {
    let root = root();

    let request = Request::builder(["version"]).build(&root).unwrap();
    assert_eq!(request.path(), ["version"]);

    let request = Request::builder(["repo", "stat"]).build(&root).unwrap();
    assert_eq!(request.path(), ["repo", "stat"]);
}

#[test]
fn empty_path_is_rejected_locally() {
    let root = root();
    let err = Request::builder(Vec::<&str>::new()).build(&root).unwrap_err();
    assert_eq!(err, PathError::Empty);
}

#[test]
fn unknown_path_surfaces_the_resolver_error() {
    let root = root();
    match Request::builder(["repo", "gc"]).build(&root).unwrap_err() {
        PathError::Unknown { segment } => assert_eq!(segment, "gc"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn arguments_and_options_are_preserved() {
    let root = root();
    let request = Request::builder(["version"])
        .argument("first")
        .argument("second")
        .option("enc", "json")
        .option("quiet", "true")
        .body(&b"payload"[..])
        .build(&root)
        .unwrap();

    assert_eq!(request.arguments(), ["first", "second"]);
    assert_eq!(request.options().get("enc").map(String::as_str), Some("json"));
    assert_eq!(
        request.options().get("quiet").map(String::as_str),
        Some("true")
    );
    assert_eq!(request.body().map(|b| b.as_ref()), Some(&b"payload"[..]));
}

#[test]
fn repeated_option_last_write_wins() {
    let root = root();
    let request = Request::builder(["version"])
        .option("enc", "json")
        .option("enc", "cbor")
        .build(&root)
        .unwrap();
    assert_eq!(request.options().get("enc").map(String::as_str), Some("cbor"));
}
