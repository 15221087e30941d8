// Bookstore demo: dispatches a handful of requests against two controllers
//
// Run with: cargo run -p quill --example bookstore
// Reads ./quill.toml when present; RUST_LOG overrides the configured log filter.

use axum::response::IntoResponse;
use quill::*;
use tracing_subscriber::EnvFilter;

fn book_controller() -> ActionTable {
    ActionTable::new()
        .with_property("title", "Quill Books")
        .with_action("list", |ctx| {
            let page = ctx.param("page").map(Value::to_string).unwrap_or_else(|| "1".into());
            Ok(Model::new()
                .with("books", vec![Value::from("Dune"), Value::from("Emma")])
                .with("page", page)
                .into())
        })
        .with_action("show", |ctx| {
            let id = ctx.param("id").map(Value::to_string).unwrap_or_default();
            Ok(Model::new().with("id", id).into())
        })
        .with_action("save", |ctx| {
            if ctx.param("title").is_none() {
                ctx.errors.reject("title", "Title is required");
                return Ok(ActionReturn::None);
            }
            ctx.chain("list", Model::new().with("message", "Book saved"))?;
            Ok(ActionReturn::None)
        })
}

fn main() -> anyhow::Result<()> {
    let config = Config::load_default()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let controllers = ControllerTable::new()
        .with_case_insensitive(config.routing.case_insensitive)
        .with_controller(
            ControllerClass::new("Book")
                .with_actions(["list", "show", "save"])
                .with_default_action("list")
                .with_allowed_methods("save", [Method::POST])
                .with_before_interceptor(InterceptScope::only(["save"]), |ctx| {
                    tracing::info!(params = ?ctx.params, "Saving book");
                    None
                }),
        )?;

    let objects = InstanceRegistry::new().with_controller("BookController", book_controller());

    let engine = DispatchEngine::new(controllers, objects, MemoryFlashStore::new())
        .with_config(config.dispatch.clone());

    let requests = vec![
        HttpRequest::get("/book"),
        HttpRequest::get("/book/show/42"),
        HttpRequest::get("/book/save"),
        HttpRequest::post("/book/save")
            .with_form(FormData::from_fields(
                [("title".to_string(), "Middlemarch".to_string())].into(),
            ))
            .with_session("demo"),
        HttpRequest::get("/book/list?page=2").with_session("demo"),
        HttpRequest::get("/book/missing"),
    ];

    for mut request in requests {
        let uri = request.path.clone();
        let mut response = BufferedResponse::new();

        match engine.dispatch(&uri, &mut request, &mut response, &Model::new()) {
            Ok(DispatchOutcome::Render(mv)) => {
                let model = serde_json::to_string(mv.model())?;
                println!("{} {} -> render {:?} {}", request.method, uri, mv.view_name(), model);
            }
            Ok(DispatchOutcome::NoRender(reason)) => {
                let status = response.into_response().status();
                println!("{} {} -> {:?} ({})", request.method, uri, reason, status);
            }
            Err(err) => {
                println!("{} {} -> {} ({})", request.method, uri, err, err.status_code());
            }
        }
    }

    Ok(())
}
