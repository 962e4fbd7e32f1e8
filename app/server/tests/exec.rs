//! Executor tests — dispatch straight against a command table, no HTTP.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use manta_server::{Command, DispatchError, Execution, Invocation, dispatch};
use protocol::{Frame, PathError, codec};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

fn invocation(path: &[&str]) -> Invocation {
    Invocation {
        path: path.iter().map(|s| (*s).into()).collect(),
        ..Invocation::default()
    }
}

/// Drain the execution's body and decode every frame.
async fn collect_frames(execution: Execution) -> Vec<Frame> {
    let chunks: Vec<Bytes> = execution.frames().collect().await;
    let mut buf = BytesMut::new();
    for chunk in &chunks {
        buf.extend_from_slice(chunk);
    }
    let mut frames = Vec::new();
    while let Some(frame) = codec::decode_frame(&mut buf).unwrap() {
        frames.push(frame);
    }
    assert!(buf.is_empty(), "body ended mid-frame");
    frames
}

fn payloads(frames: &[Frame]) -> Vec<Value> {
    frames
        .iter()
        .map(|frame| match frame {
            Frame::Value { payload } => payload.clone(),
            Frame::Error { message } => panic!("unexpected error frame: {message}"),
        })
        .collect()
}

#[tokio::test]
async fn values_are_framed_in_emission_order() {
    let root = Command::group().subcommand(
        "seq",
        Command::new(|ctx| async move {
            for i in 1..=3u32 {
                ctx.emit(&i).await?;
            }
            Ok(())
        }),
    );

    let frames = collect_frames(dispatch(&root, invocation(&["seq"])).unwrap()).await;
    assert_eq!(payloads(&frames), vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn handler_error_is_the_trailing_frame() {
    let root = Command::group().subcommand(
        "fail",
        Command::new(|ctx| async move {
            ctx.emit(&"partial").await?;
            anyhow::bail!("an error occurred")
        }),
    );

    let frames = collect_frames(dispatch(&root, invocation(&["fail"])).unwrap()).await;
    assert_eq!(frames.len(), 2);
    assert!(matches!(&frames[0], Frame::Value { payload } if payload == &json!("partial")));
    match &frames[1] {
        Frame::Error { message } => assert_eq!(message, "an error occurred"),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn arguments_and_options_reach_the_handler() {
    let root = Command::group().subcommand(
        "greet",
        Command::new(|ctx| async move {
            assert_eq!(ctx.invocation().path.join("/"), "greet");
            let greeting = ctx.option("greeting").unwrap_or("hello").to_string();
            let name = ctx.argument(0).unwrap_or("world").to_string();
            ctx.emit(&format!("{greeting}, {name}!")).await
        }),
    );

    let mut invocation = invocation(&["greet"]);
    invocation.arguments.push("crew".to_string());
    invocation
        .options
        .insert("greeting".into(), "ahoy".to_string());

    let frames = collect_frames(dispatch(&root, invocation).unwrap()).await;
    assert_eq!(payloads(&frames), vec![json!("ahoy, crew!")]);
}

#[tokio::test]
async fn body_reaches_the_handler() {
    let root = Command::group().subcommand(
        "wc",
        Command::new(|ctx| async move {
            let len = ctx.body().map(|b| b.len() as u64).unwrap_or(0);
            ctx.emit(&len).await
        }),
    );

    let mut invocation = invocation(&["wc"]);
    invocation.body = Some(Bytes::from_static(b"hello world"));

    let frames = collect_frames(dispatch(&root, invocation).unwrap()).await;
    assert_eq!(payloads(&frames), vec![json!(11)]);
}

#[tokio::test]
async fn close_is_idempotent_and_emit_after_close_fails() {
    let root = Command::group().subcommand(
        "doubleclose",
        Command::new(|ctx| async move {
            ctx.emit(&"some value").await?;
            ctx.close().await;
            ctx.close().await;
            assert!(ctx.emit(&"late").await.is_err());
            Ok(())
        }),
    );

    let frames = collect_frames(dispatch(&root, invocation(&["doubleclose"])).unwrap()).await;
    assert_eq!(payloads(&frames), vec![json!("some value")]);
}

#[tokio::test]
async fn completion_outlives_the_frame_stream() {
    let gate = Arc::new(Notify::new());
    let root = {
        let gate = gate.clone();
        Command::group().subcommand(
            "single",
            Command::new(move |ctx| {
                let gate = gate.clone();
                async move {
                    ctx.emit(&"some value").await?;
                    ctx.background(async move { gate.notified().await });
                    Ok(())
                }
            }),
        )
    };

    let execution = dispatch(&root, invocation(&["single"])).unwrap();
    let completion = execution.completion();
    let frames = collect_frames(execution).await;
    assert_eq!(payloads(&frames), vec![json!("some value")]);

    // The body is fully drained but the background task is still gated.
    assert!(!completion.is_signaled());

    gate.notify_one();
    timeout(Duration::from_secs(1), completion.wait())
        .await
        .expect("completion never signaled");
    assert!(completion.is_signaled());
}

#[tokio::test]
async fn completion_signals_without_background_work() {
    let root = Command::group().subcommand(
        "noop",
        Command::new(|_ctx| async { Ok(()) }),
    );

    let execution = dispatch(&root, invocation(&["noop"])).unwrap();
    let completion = execution.completion();
    let frames = collect_frames(execution).await;
    assert!(frames.is_empty());

    timeout(Duration::from_secs(1), completion.wait())
        .await
        .expect("completion never signaled");
}

#[tokio::test]
async fn dispatch_unknown_path() {
    let root = Command::group().subcommand("noop", Command::new(|_ctx| async { Ok(()) }));

    match dispatch(&root, invocation(&["nope"])).unwrap_err() {
        DispatchError::Path(PathError::Unknown { segment }) => assert_eq!(segment, "nope"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_group_is_not_invokable() {
    let root = Command::group().subcommand("repo", Command::group());

    assert!(matches!(
        dispatch(&root, invocation(&["repo"])).unwrap_err(),
        DispatchError::NotInvokable
    ));
}
