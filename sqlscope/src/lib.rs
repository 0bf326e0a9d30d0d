//! Command-line front end for sqlscope.
//!
//! Mirrors the metadata façade: every catalog command loads the engine
//! configuration, opens the configured datasources and prints one JSON
//! document. `nextval` and `lastval` only render statement text and never
//! connect.

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use sqlscope_core::{
    ArtifactKind, CallContext, DatabaseMetadataService, DatasourceRegistry, Dialect, DialectKind,
    EngineConfig, logging::LogFormat,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "sqlscope")]
#[command(about = "Catalog metadata and cross-dialect SQL statements")]
#[command(version)]
#[command(long_about = "
sqlscope - catalog metadata and cross-dialect SQL statements

Reads schemas, tables, views, routines and sequences from configured
datasources and prints them as JSON metadata documents. Also renders
sequence and identity statements for every supported dialect.

Connection URLs are never printed or logged in clear text.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Engine configuration file (JSON)
    #[arg(long, global = true, env = "SQLSCOPE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Deadline for the whole command, in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Logging flags shared by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    /// Log output format selected by the flags.
    pub fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured datasource names
    Datasources,

    /// List the schema names of a datasource
    Schemas {
        /// Datasource name
        datasource: String,
    },

    /// Print the metadata document of one schema
    Schema {
        /// Datasource name
        datasource: String,
        /// Schema name
        schema: String,
    },

    /// Print the metadata document of one structure
    Structure {
        /// Datasource name
        datasource: String,
        /// Schema name
        schema: String,
        /// Structure name
        name: String,
        /// Structure kind (table, view, procedure, function, sequence);
        /// every kind is tried in turn when omitted
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Print the metadata document of a whole datasource
    Datasource {
        /// Datasource name
        datasource: String,
    },

    /// Check whether an artifact exists
    Exists {
        /// Datasource name
        datasource: String,
        /// Artifact name, optionally schema-qualified
        name: String,
        /// Artifact kind (table, view, sequence, synonym, procedure, function, ...)
        #[arg(short, long)]
        kind: String,
    },

    /// Render the next-value statement of a sequence
    Nextval {
        #[command(flatten)]
        dialect: DialectArgs,
        /// Sequence name
        sequence: String,
    },

    /// Render the last-inserted-identity statement
    Lastval {
        #[command(flatten)]
        dialect: DialectArgs,
        /// Dialect-specific arguments (table, or table and column)
        args: Vec<String>,
    },
}

/// Dialect selection for offline statement rendering.
#[derive(Debug, Args)]
pub struct DialectArgs {
    /// Dialect (default, hana, derby, postgresql, sqlite)
    #[arg(short, long, default_value = "default")]
    pub dialect: String,

    /// Quote identifiers
    #[arg(long)]
    pub case_sensitive: bool,
}

impl DialectArgs {
    fn dialect(&self) -> anyhow::Result<Dialect> {
        let kind: DialectKind = self.dialect.parse()?;
        Ok(Dialect::for_kind(kind, self.case_sensitive))
    }
}

/// Runs `cli` and returns the text to print.
///
/// `cancel` aborts in-flight catalog reads, e.g. on Ctrl-C.
pub async fn run(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<String> {
    match &cli.command {
        Command::Nextval { dialect, sequence } => {
            return Ok(dialect.dialect()?.nextval(sequence.as_str()).generate()?);
        }
        Command::Lastval { dialect, args } => {
            return Ok(dialect.dialect()?.lastval(args.iter().cloned()).generate()?);
        }
        _ => {}
    }

    let path = cli
        .config
        .as_ref()
        .ok_or_else(|| anyhow!("no configuration file given; use --config or SQLSCOPE_CONFIG"))?;
    let config = EngineConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let registry = DatasourceRegistry::from_config(&config).await?;
    let service = DatabaseMetadataService::new(registry);

    let mut context = match cli.timeout {
        Some(seconds) => CallContext::with_timeout(Duration::from_secs(seconds)),
        None => CallContext::new(),
    };
    context = context.cancelled_by(cancel);

    let outcome = dispatch(&service, &context, &cli.command).await;
    service.registry().close().await;
    Ok(serde_json::to_string_pretty(&outcome?)?)
}

async fn dispatch(
    service: &DatabaseMetadataService,
    context: &CallContext,
    command: &Command,
) -> anyhow::Result<Value> {
    let document = match command {
        Command::Datasources => json!(service.list_datasource_names()),
        Command::Schemas { datasource } => {
            json!(service.list_schema_names(context, datasource).await?)
        }
        Command::Schema { datasource, schema } => {
            service
                .get_schema_metadata_document(context, datasource, schema)
                .await?
        }
        Command::Structure {
            datasource,
            schema,
            name,
            kind: Some(kind),
        } => {
            service
                .get_structure_metadata_document(context, datasource, schema, name, kind)
                .await?
        }
        Command::Structure {
            datasource,
            schema,
            name,
            kind: None,
        } => {
            service
                .find_structure_metadata_document(context, datasource, schema, name)
                .await?
        }
        Command::Datasource { datasource } => {
            service
                .get_datasource_metadata_document(context, datasource)
                .await?
        }
        Command::Exists {
            datasource,
            name,
            kind,
        } => {
            let artifact: ArtifactKind = kind.parse()?;
            let exists = service
                .artifact_exists(context, datasource, name, artifact)
                .await?;
            tracing::debug!(datasource = %datasource, name = %name, kind = %artifact, exists, "Existence check");
            json!({ "name": name, "kind": artifact.to_string(), "exists": exists })
        }
        Command::Nextval { .. } | Command::Lastval { .. } => {
            return Err(anyhow!("statement commands do not read a datasource"));
        }
    };
    Ok(document)
}
