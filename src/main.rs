//! golr-assoc CLI: association queries against Golr indexes.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use golr_assoc::backend::solr_params;
use golr_assoc::config::GolrConfig;
use golr_assoc::query::{IdFilter, QueryRequest, Rows};
use golr_assoc::service::AssociationService;

#[derive(Parser)]
#[command(name = "golr-assoc", version, about = "Association queries over Golr indexes")]
struct Cli {
    /// TOML configuration file (built-in endpoints when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Solr parameters a query compiles to, without sending it.
    Compile {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Search associations and print them as JSON.
    Search {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// List distinct values of a field among matching associations.
    Distinct {
        /// Canonical field name, e.g. "subject" or "object".
        #[arg(long, default_value = "object")]
        field: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Information content of each object among matching associations.
    Ic {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Count matching associations under each closure bin.
    Bins {
        /// Bin classes (comma-separated).
        #[arg(long, value_delimiter = ',', required = true)]
        bins: Vec<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Fetch one association by document id.
    Get {
        id: String,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args)]
struct QueryArgs {
    /// Subject id; repeat or comma-separate for any-of.
    #[arg(long, value_delimiter = ',')]
    subject: Vec<String>,

    /// Object id; repeat or comma-separate for any-of.
    #[arg(long, value_delimiter = ',')]
    object: Vec<String>,

    #[arg(long)]
    subject_category: Option<String>,

    /// Also selects the backend ("function" queries the GO index).
    #[arg(long)]
    object_category: Option<String>,

    #[arg(long)]
    subject_taxon: Option<String>,

    #[arg(long)]
    object_taxon: Option<String>,

    #[arg(long)]
    relation: Option<String>,

    /// Evidence class; prefix with "-" to exclude it.
    #[arg(long, allow_hyphen_values = true)]
    evidence: Option<String>,

    /// Exclude electronic (IEA) annotations.
    #[arg(long)]
    exclude_automatic: bool,

    /// Swap subject and object constraints.
    #[arg(long)]
    invert: bool,

    /// Match the subject exactly instead of through its closure.
    #[arg(long)]
    subject_direct: bool,

    #[arg(long)]
    object_direct: bool,

    /// Slim classes (comma-separated).
    #[arg(long, value_delimiter = ',')]
    slim: Vec<String>,

    /// Rows to return; negative for unlimited.
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    rows: i64,

    #[arg(long, default_value = "0")]
    start: u64,

    /// Facet fields (comma-separated), replacing the defaults.
    #[arg(long, value_delimiter = ',')]
    facet_field: Vec<String>,

    /// Pivot facet on subject and object.
    #[arg(long)]
    pivot: bool,

    /// Group objects by (subject, relation).
    #[arg(long)]
    compact: bool,

    /// Also list distinct objects.
    #[arg(long)]
    fetch_objects: bool,

    /// Rewrite subject ids to the closure member with this prefix.
    #[arg(long)]
    map_identifiers: Option<String>,
}

fn id_filter(ids: &[String]) -> Option<IdFilter> {
    match ids {
        [] => None,
        [one] => Some(IdFilter::One(one.clone())),
        many => Some(IdFilter::AnyOf(many.to_vec())),
    }
}

impl QueryArgs {
    fn to_request(&self) -> QueryRequest {
        QueryRequest {
            subject: id_filter(&self.subject),
            object: id_filter(&self.object),
            subject_category: self.subject_category.clone(),
            object_category: self.object_category.clone(),
            subject_taxon: self.subject_taxon.clone(),
            object_taxon: self.object_taxon.clone(),
            relation: self.relation.clone(),
            evidence: self.evidence.clone(),
            exclude_automatic_assertions: self.exclude_automatic,
            invert_subject_object: self.invert,
            subject_direct: self.subject_direct,
            object_direct: self.object_direct,
            slim: self.slim.clone(),
            rows: Rows::from(self.rows),
            start: self.start,
            facet_fields: (!self.facet_field.is_empty()).then(|| self.facet_field.clone()),
            pivot_subject_object: self.pivot,
            use_compact_associations: self.compact,
            fetch_objects: self.fetch_objects,
            map_identifiers: self.map_identifiers.clone(),
            ..Default::default()
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GolrConfig::load(path)?,
        None => GolrConfig::default(),
    };

    match cli.command {
        Commands::Compile { query } => {
            let service = AssociationService::connect(&config)?;
            let compiled = service.compiler().compile(&query.to_request());
            println!("# endpoint: {} ({})", compiled.endpoint.name, compiled.endpoint.select_url());
            for (k, v) in solr_params(&compiled) {
                println!("{k}={v}");
            }
        }

        Commands::Search { query } => {
            let service = AssociationService::connect(&config)?;
            let results = service.search_associations(&query.to_request())?;
            for warning in &results.warnings {
                eprintln!("warning: {warning}");
            }
            print_json(&results)?;
        }

        Commands::Distinct { field, query } => {
            let service = AssociationService::connect(&config)?;
            let values = service.select_distinct(&field, &query.to_request())?;
            for v in values {
                println!("{v}");
            }
        }

        Commands::Ic { query } => {
            let service = AssociationService::connect(&config)?;
            let ic = service.calculate_information_content(&query.to_request())?;
            for (id, value) in ic {
                println!("{id}\t{value:.4}");
            }
        }

        Commands::Bins { bins, query } => {
            let service = AssociationService::connect(&config)?;
            let counts = service.closure_bins(&query.to_request(), &bins)?;
            for bin in counts {
                println!("{}\t{}", bin.id, bin.count);
            }
        }

        Commands::Get { id } => {
            let service = AssociationService::connect(&config)?;
            match service.get_association(&id)? {
                Some(assoc) => print_json(&assoc)?,
                None => {
                    eprintln!("No association with id \"{id}\".");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
