mod config;
mod error;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gate::{ConditionalGate, GateConfig};
use graphql::{ExecutionResult, HeaderSet, Response};
use serde::Serialize;
use server::{GraphQLRequest, Server};
use tracing_subscriber::EnvFilter;

use error::Result;

#[derive(Parser)]
#[command(name = "introspection-gate")]
#[command(about = "Run GraphQL queries through a conditional introspection gate", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one query and print the response
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// SDL schema file
    #[arg(short, long)]
    schema: PathBuf,

    /// Gate settings (defaults to ./gate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request header as name:value (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Operation to run when the document defines several
    #[arg(short, long)]
    operation_name: Option<String>,

    /// Variables as a JSON object
    #[arg(long)]
    variables: Option<String>,

    /// Read the query from a file
    #[arg(short = 'f', long, conflicts_with = "query")]
    query_file: Option<PathBuf>,

    /// Query text
    #[arg(required_unless_present = "query_file")]
    query: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Check(args) => cmd_check(args).await,
    }
}

async fn cmd_check(args: CheckArgs) -> Result<()> {
    let response = check(args).await?;
    println!("{}", render(&response)?);
    Ok(())
}

/// Build a server with the gate installed and run the requested query.
async fn check(args: CheckArgs) -> Result<Response> {
    let sdl = config::read_file(&args.schema)?;
    let settings = config::load_settings(args.config.as_deref())?;
    tracing::debug!(allow = ?settings.allow, "loaded gate settings");

    let query = match (&args.query_file, args.query) {
        (Some(path), _) => config::read_file(path)?,
        (None, Some(query)) => query,
        (None, None) => String::new(),
    };

    let mut request = GraphQLRequest::new(query)
        .with_variables(config::parse_variables(args.variables.as_deref())?)
        .with_headers(config::parse_headers(&args.headers)?);
    if let Some(name) = args.operation_name {
        request = request.with_operation_name(name);
    }

    let server = Server::from_sdl(&sdl)?
        .plugin(ConditionalGate::new(GateConfig::from_settings(settings)))
        .build()?;

    Ok(server.execute_operation(request).await)
}

/// What `check` prints.
#[derive(Serialize)]
struct Output<'a> {
    status: Option<u16>,
    headers: &'a HeaderSet,
    body: &'a ExecutionResult,
}

fn render(response: &Response) -> Result<String> {
    let output = Output {
        status: response.http.status,
        headers: &response.http.headers,
        body: response.result(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql::GraphQLError;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_cli_parses_check() {
        let cli = Cli::try_parse_from([
            "introspection-gate",
            "-v",
            "check",
            "--schema",
            "schema.graphql",
            "-H",
            "x-a: 1",
            "--header",
            "x-b:2",
            "{ __schema { queryType { name } } }",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Check(args) = cli.command;
        assert_eq!(args.schema, PathBuf::from("schema.graphql"));
        assert_eq!(args.headers, vec!["x-a: 1", "x-b:2"]);
        assert!(args.query.is_some());
        assert!(args.query_file.is_none());
    }

    #[test]
    fn test_cli_requires_query() {
        let result = Cli::try_parse_from(["introspection-gate", "check", "--schema", "s.graphql"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "introspection-gate",
            "check",
            "--schema",
            "s.graphql",
            "--query-file",
            "q.graphql",
            "{ a }",
        ]);
        assert!(result.is_err());
    }

    const SDL: &str = "type Query { helloWorld: String }";
    const SETTINGS: &str = r#"
        status_code = 403

        [headers]
        x-introspection = "disabled"

        [allow]
        mode = "header"
        name = "x-allow-introspection"
    "#;

    /// Write the schema and settings into `dir` and parse a `check` command.
    fn check_args(dir: &Path, extra: &[&str]) -> CheckArgs {
        let schema = dir.join("schema.graphql");
        let config = dir.join("gate.toml");
        std::fs::write(&schema, SDL).unwrap();
        std::fs::write(&config, SETTINGS).unwrap();

        let mut argv = vec![
            "introspection-gate".to_string(),
            "check".to_string(),
            "--schema".to_string(),
            schema.display().to_string(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        argv.extend(extra.iter().map(|arg| arg.to_string()));

        let Commands::Check(args) = Cli::try_parse_from(argv).unwrap().command;
        args
    }

    #[tokio::test]
    async fn test_check_blocks_introspection() {
        let dir = tempfile::tempdir().unwrap();
        let args = check_args(dir.path(), &["{ __schema { queryType { name } } }"]);

        let response = check(args).await.unwrap();
        assert_eq!(response.http.status, Some(403));
        assert_eq!(response.http.headers.get("x-introspection"), Some("disabled"));
        assert_eq!(response.result().data, None);
        assert_eq!(
            response.result().errors[0].code(),
            Some(gate::DEFAULT_ERROR_CODE)
        );
    }

    #[tokio::test]
    async fn test_check_allows_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let args = check_args(
            dir.path(),
            &[
                "-H",
                "X-Allow-Introspection: 1",
                "{ __schema { queryType { name } } }",
            ],
        );

        let response = check(args).await.unwrap();
        assert_eq!(response.http.status, None);
        assert_eq!(
            response.result().data,
            Some(json!({"__schema": {"queryType": {"name": "Query"}}}))
        );
    }

    #[tokio::test]
    async fn test_check_reads_query_file() {
        let dir = tempfile::tempdir().unwrap();
        let query = dir.path().join("query.graphql");
        std::fs::write(&query, "query A { __typename } query B { helloWorld }").unwrap();
        let query = query.display().to_string();
        let args = check_args(dir.path(), &["--query-file", &query, "--operation-name", "B"]);

        let response = check(args).await.unwrap();
        let rendered: serde_json::Value = serde_json::from_str(&render(&response).unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({"status": null, "headers": {}, "body": {"data": {"helloWorld": null}}})
        );
    }

    #[tokio::test]
    async fn test_check_missing_schema() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = check_args(dir.path(), &["{ helloWorld }"]);
        args.schema = dir.path().join("missing.graphql");

        let err = check(args).await.unwrap_err();
        assert!(matches!(err, error::Error::Read { .. }));
    }

    #[test]
    fn test_render() {
        let response = Response::single(ExecutionResult::errors(vec![
            GraphQLError::new("Message").with_code("CODE"),
        ]))
        .with_status(400)
        .with_headers([("x-custom-header", "custom")]);

        let rendered: serde_json::Value = serde_json::from_str(&render(&response).unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "status": 400,
                "headers": {"x-custom-header": "custom"},
                "body": {"data": null, "errors": [{"message": "Message", "extensions": {"code": "CODE"}}]}
            })
        );
    }
}
