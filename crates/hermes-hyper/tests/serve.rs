//! End-to-end tests for the hyper transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use hermes_core::{HandlerFailure, ParamSpec, Shape};
use hermes_dispatch::{
    dispatch, BoxError, Controller, ControllerState, HandlerValue, HeaderSet, Operation,
};
use hermes_extract::{ExtractConfig, Params};
use hermes_hyper::{serve, HyperTransport, ResponseSink, SinkBody};
use http::{header, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};

fn get(uri: &str) -> Request<Full<Bytes>> {
    Request::get(uri).body(Full::new(Bytes::new())).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Full<Bytes>> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

async fn body_bytes(response: Response<SinkBody>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: Response<SinkBody>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn user_operation() -> Operation {
    Operation::new("updateUser")
        .param(ParamSpec::path("id", Shape::integer().required()))
        .param(ParamSpec::query("notify", Shape::boolean()))
        .param(ParamSpec::body_field("email", Shape::string().required()))
}

#[tokio::test]
async fn test_returned_value_becomes_json_response() {
    let params: Params = [("id", "42")].into_iter().collect();
    let response = serve(
        &HyperTransport::new(),
        &user_operation(),
        post_json("/users/42?notify=true", r#"{"email":"ada@example.com"}"#),
        params,
        &ExtractConfig::default(),
        &(),
        |args| async move {
            assert_eq!(args[0].json(), Some(&json!(42)));
            assert_eq!(args[1].json(), Some(&json!(true)));
            assert_eq!(args[2].json(), Some(&json!("ada@example.com")));
            Ok::<_, HandlerFailure>(HandlerValue::from(json!({"ok": true})))
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json(response).await, json!({"ok": true}));
}

#[tokio::test]
async fn test_validation_failure_answers_400_with_every_field() {
    let called = AtomicBool::new(false);
    let params: Params = [("id", "abc")].into_iter().collect();

    let response = serve(
        &HyperTransport::new(),
        &user_operation(),
        post_json("/users/abc?notify=maybe", "{}"),
        params,
        &ExtractConfig::default(),
        &(),
        |_| {
            called.store(true, Ordering::SeqCst);
            async { Ok::<_, HandlerFailure>(HandlerValue::Empty) }
        },
    )
    .await
    .unwrap();

    assert!(!called.load(Ordering::SeqCst));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["name"], "ValidateError");
    let fields: Vec<&String> = body["fields"].as_object().unwrap().keys().collect();
    assert_eq!(fields, vec!["id", "notify", "body.email"]);
}

#[tokio::test]
async fn test_handler_failure_goes_through_error_pipeline() {
    let response = serve(
        &HyperTransport::new(),
        &Operation::new("explode"),
        get("/explode"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |_| async { Err::<HandlerValue, _>(HandlerFailure::named("StoreError", "db down")) },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["name"], "StoreError");
    assert_eq!(body["message"], "db down");
}

#[tokio::test]
async fn test_handler_failure_keeps_its_status() {
    let response = serve(
        &HyperTransport::new(),
        &Operation::new("find"),
        get("/find"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |_| async {
            Err::<HandlerValue, _>(
                HandlerFailure::named("NotFound", "missing").with_status(StatusCode::NOT_FOUND),
            )
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_controller_state_applied() {
    let controller = Arc::new(ControllerState::new());
    let operation = Operation::new("create").success_status(StatusCode::CREATED);

    let response = serve(
        &HyperTransport::new(),
        &operation,
        get("/create"),
        Params::new(),
        &ExtractConfig::default(),
        &controller,
        |_| {
            let controller = Arc::clone(&controller);
            async move {
                controller.set_status(StatusCode::ACCEPTED);
                controller.set_header("location", Some("/jobs/1".into()));
                Ok::<_, HandlerFailure>(HandlerValue::Empty)
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.headers()[header::LOCATION], "/jobs/1");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_success_status_used_without_controller() {
    let operation = Operation::new("create").success_status(StatusCode::CREATED);

    let response = serve(
        &HyperTransport::new(),
        &operation,
        get("/create"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |_| async { Ok::<_, HandlerFailure>(HandlerValue::from(json!({"id": 1}))) },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_responder_wins_over_returned_value() {
    let operation = Operation::new("legacy").param(ParamSpec::responder("res"));

    let response = serve(
        &HyperTransport::new(),
        &operation,
        get("/legacy"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |args| async move {
            let responder = args[0].responder().cloned().unwrap();
            let mut headers = HeaderSet::new();
            headers.insert("x-source".into(), "responder".into());
            responder.respond(StatusCode::IM_A_TEAPOT, json!({"via": "responder"}), headers);
            Ok::<_, HandlerFailure>(HandlerValue::from(json!({"via": "return"})))
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.headers()["x-source"], "responder");
    assert_eq!(body_json(response).await, json!({"via": "responder"}));
}

#[tokio::test]
async fn test_failure_after_responder_keeps_first_response() {
    let operation = Operation::new("legacy").param(ParamSpec::responder("res"));

    let response = serve(
        &HyperTransport::new(),
        &operation,
        get("/legacy"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |args| async move {
            let responder = args[0].responder().cloned().unwrap();
            responder.respond(None::<StatusCode>, HandlerValue::Empty, HeaderSet::new());
            Err::<HandlerValue, _>(HandlerFailure::new("late failure"))
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_stream_piped_verbatim() {
    let response = serve(
        &HyperTransport::new(),
        &Operation::new("download"),
        get("/download"),
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |_| async {
            let chunks: Vec<Result<Bytes, BoxError>> =
                vec![Ok(Bytes::from_static(b"\x00\x01")), Ok(Bytes::from_static(b"raw"))];
            Ok::<_, HandlerFailure>(HandlerValue::stream(stream::iter(chunks)))
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"\x00\x01raw"));
}

#[tokio::test]
async fn test_each_file_parameter_binds_its_own_field() {
    let body = "--XB\r\n\
        Content-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\n\
        Content-Type: image/png\r\n\r\n\
        AAA\r\n\
        --XB\r\n\
        Content-Disposition: form-data; name=\"cover\"; filename=\"c.png\"\r\n\
        Content-Type: image/png\r\n\r\n\
        CCC\r\n\
        --XB--\r\n";
    let request = Request::post("/profile")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XB")
        .body(Full::new(Bytes::from(body)))
        .unwrap();
    let operation = Operation::new("uploadProfile")
        .param(ParamSpec::form("avatar", Shape::file().required()))
        .param(ParamSpec::form("cover", Shape::file().required()));

    let response = serve(
        &HyperTransport::new(),
        &operation,
        request,
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |args| async move {
            let data = |i: usize| {
                args[i]
                    .value()
                    .and_then(|v| v.as_file())
                    .map(|f| String::from_utf8_lossy(&f.data).into_owned())
            };
            Ok::<_, HandlerFailure>(HandlerValue::from(json!({
                "avatar": data(0),
                "cover": data(1),
            })))
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"avatar": "AAA", "cover": "CCC"}));
}

#[tokio::test]
async fn test_unsupported_media_type_answered_before_binding() {
    let request = Request::post("/upload")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Full::new(Bytes::from_static(b"\x00")))
        .unwrap();

    let response = serve(
        &HyperTransport::new(),
        &Operation::new("upload"),
        request,
        Params::new(),
        &ExtractConfig::default(),
        &(),
        |_| async { Ok::<_, HandlerFailure>(HandlerValue::Empty) },
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_dispatch_failure_reaches_caller_unchanged() {
    let (sink, _pending) = ResponseSink::channel();
    let request = hermes_hyper::ExchangeRequest::from_request(
        get("/x"),
        Params::new(),
        &ExtractConfig::default(),
    )
    .await
    .unwrap();

    let err = dispatch(
        &HyperTransport::new(),
        &Operation::new("x"),
        &request,
        &sink,
        &(),
        |_| async { Err::<HandlerValue, _>(HandlerFailure::named("Custom", "kept")) },
    )
    .await
    .unwrap_err();

    assert_eq!(err.name(), "Custom");
    assert_eq!(err.to_string(), "kept");
    assert!(!sink.is_finalized());
}

#[tokio::test]
async fn test_serves_over_hyper_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let transport = HyperTransport::new();
    let operation = Operation::new("getUser")
        .param(ParamSpec::path("id", Shape::integer().required()))
        .param(ParamSpec::header("x-tenant", Shape::string()));

    let server = async {
        let (stream, _) = listener.accept().await.unwrap();
        let service = service_fn(|request: Request<Incoming>| {
            let params: Params = [("id", "7")].into_iter().collect();
            let transport = &transport;
            let operation = &operation;
            async move {
                serve(
                    transport,
                    operation,
                    request,
                    params,
                    &ExtractConfig::default(),
                    &(),
                    |args| async move {
                        let id = args[0].json().cloned().unwrap_or_default();
                        let tenant = args[1].json().cloned().unwrap_or_default();
                        Ok::<_, HandlerFailure>(HandlerValue::from(
                            json!({"id": id, "tenant": tenant}),
                        ))
                    },
                )
                .await
            }
        });
        http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .await
            .unwrap();
    };

    let client = async {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .unwrap();

        let exchange = async move {
            let request = Request::get("/users/7")
                .header(header::HOST, "localhost")
                .header("x-tenant", "acme")
                .body(Full::new(Bytes::new()))
                .unwrap();
            let response = sender.send_request(request).await.unwrap();
            let status = response.status();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            (status, body)
        };
        let connection = async {
            let _ = connection.await;
        };

        let ((status, body), ()) = tokio::join!(exchange, connection);
        (status, body)
    };

    let ((), (status, body)) = tokio::join!(server, client);
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"id": 7, "tenant": "acme"}));
}
