use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use estuary::aggregation::{AvgAggregation, TermsAggregation};
use estuary::query::{BoolQuery, MatchQuery, TermQuery};
use estuary::{
    Client, ClientConfig, CreateIndexParam, DeleteParam, GetParam, IndexParam, Property,
    PropertyType, PutMappingParam, Query, SearchParam, SortOrder, UpdateParam,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "estuary")]
#[command(about = "Estuary CLI - index administration and ad-hoc queries")]
#[command(version)]
struct Cli {
    /// TOML file with scheme/host/port/request_timeout_ms
    #[arg(long, global = true, env = "ESTUARY_CONFIG")]
    config: Option<PathBuf>,

    /// Search service host (overrides the config file)
    #[arg(long, global = true, env = "ESTUARY_HOST")]
    host: Option<String>,

    /// Search service port (overrides the config file)
    #[arg(long, global = true, env = "ESTUARY_PORT")]
    port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an index with settings and field mappings
    CreateIndex {
        index: String,

        #[arg(long, default_value = "5")]
        shards: u32,

        #[arg(long, default_value = "1")]
        replicas: u32,

        /// Field as name:type[:analyzer], repeatable
        #[arg(long = "property", value_parser = parse_property)]
        properties: Vec<Property>,
    },

    /// Show aliases, mappings and settings of an index
    GetIndex { index: String },

    /// Add fields to an index mapping
    PutMapping {
        index: String,

        /// Field as name:type[:analyzer], repeatable
        #[arg(long = "property", value_parser = parse_property, required = true)]
        properties: Vec<Property>,
    },

    /// Delete an index
    DeleteIndex { index: String },

    /// Store a JSON document
    IndexDoc {
        index: String,

        /// Document id; the service assigns one when omitted
        #[arg(long)]
        id: Option<String>,

        /// Document body as JSON
        document: String,
    },

    /// Fetch a document by id
    GetDoc { index: String, id: String },

    /// Merge a partial JSON document into a stored one
    UpdateDoc {
        index: String,
        id: String,
        partial: String,
    },

    /// Delete a document by id
    DeleteDoc { index: String, id: String },

    /// Search an index
    Search {
        index: String,

        /// Full-text match as field=text, repeatable
        #[arg(long = "match", value_parser = parse_pair)]
        matches: Vec<(String, String)>,

        /// Exact match as field=value, repeatable
        #[arg(long = "term", value_parser = parse_pair)]
        terms: Vec<(String, String)>,

        /// Sort as field:asc|desc, repeatable
        #[arg(long = "sort", value_parser = parse_sort)]
        sort: Vec<(String, SortOrder)>,

        #[arg(long, default_value = "0")]
        from: u64,

        #[arg(long, default_value = "10")]
        size: u64,

        /// Terms aggregation as name:field[:size]
        #[arg(long = "terms-agg")]
        terms_agg: Vec<String>,

        /// Average aggregation as name:field
        #[arg(long = "avg-agg")]
        avg_agg: Vec<String>,
    },
}

fn parse_property(raw: &str) -> std::result::Result<Property, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [name, ty] => {
            let ty: PropertyType = ty.parse().map_err(|e: estuary::Error| e.to_string())?;
            Ok(match ty {
                PropertyType::None => Property::object(*name),
                other => Property::new(*name, other),
            })
        }
        [name, ty, analyzer] => {
            let ty: PropertyType = ty.parse().map_err(|e: estuary::Error| e.to_string())?;
            Ok(Property::with_analyzer(*name, ty, *analyzer))
        }
        _ => Err(format!("expected name:type[:analyzer], got '{}'", raw)),
    }
}

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))
}

fn parse_sort(raw: &str) -> std::result::Result<(String, SortOrder), String> {
    let (field, order) = raw.split_once(':').unwrap_or((raw, "asc"));
    let order = match order {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => return Err(format!("sort order must be asc or desc, got '{}'", other)),
    };
    Ok((field.to_string(), order))
}

/// Term values are sent as JSON when they parse as such, otherwise as strings
fn term_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_query(matches: Vec<(String, String)>, terms: Vec<(String, String)>) -> Option<Query> {
    let mut clauses: Vec<Query> = matches
        .into_iter()
        .map(|(field, text)| MatchQuery::new(field, text).into())
        .chain(
            terms
                .into_iter()
                .map(|(field, value)| TermQuery::new(field, term_value(&value)).into()),
        )
        .collect();
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(Query::Bool(
            clauses
                .into_iter()
                .fold(BoolQuery::new(), |q, clause| q.must(clause)),
        )),
    }
}

fn build_search(
    index: String,
    query: Option<Query>,
    sort: Vec<(String, SortOrder)>,
    from: u64,
    size: u64,
    terms_agg: Vec<String>,
    avg_agg: Vec<String>,
) -> Result<SearchParam> {
    let mut param = SearchParam::new(index).from(from).size(size);
    if let Some(query) = query {
        param = param.query(query);
    }
    for (field, order) in sort {
        param = param.sort(field, order);
    }
    for raw in terms_agg {
        let parts: Vec<&str> = raw.split(':').collect();
        let agg = match parts.as_slice() {
            [name, field] => TermsAggregation::new(*name, *field),
            [name, field, size] => TermsAggregation::new(*name, *field)
                .size(size.parse().with_context(|| format!("bad size in '{}'", raw))?),
            _ => bail!("expected name:field[:size], got '{}'", raw),
        };
        param = param.aggregation(agg);
    }
    for raw in avg_agg {
        let Some((name, field)) = raw.split_once(':') else {
            bail!("expected name:field, got '{}'", raw);
        };
        param = param.aggregation(AvgAggregation::new(name, field));
    }
    Ok(param)
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = load_config(&cli)?;
    let client = Client::new(&config)?;

    match cli.command {
        Commands::CreateIndex {
            index,
            shards,
            replicas,
            properties,
        } => {
            let param = properties
                .into_iter()
                .fold(CreateIndexParam::new(shards, replicas), |p, prop| {
                    p.add_property(prop)
                });
            print(&client.indices().create(&index, &param).await?)?;
        }
        Commands::GetIndex { index } => {
            print(&client.indices().get(&index).await?)?;
        }
        Commands::PutMapping { index, properties } => {
            let param = properties
                .into_iter()
                .fold(PutMappingParam::new(), |p, prop| p.add_property(prop));
            print(&client.indices().put_mapping(&index, &param).await?)?;
        }
        Commands::DeleteIndex { index } => {
            print(&client.indices().delete_index(&index).await?)?;
        }
        Commands::IndexDoc {
            index,
            id,
            document,
        } => {
            let document: Value =
                serde_json::from_str(&document).context("document is not valid JSON")?;
            let param = match id {
                Some(id) => IndexParam::new(index, id),
                None => IndexParam::auto_id(index),
            };
            print(&client.documents().index(&param, &document).await?)?;
        }
        Commands::GetDoc { index, id } => {
            print(&client.documents().get(&GetParam::new(index, id)).await?)?;
        }
        Commands::UpdateDoc { index, id, partial } => {
            let partial: Value =
                serde_json::from_str(&partial).context("partial document is not valid JSON")?;
            let param = UpdateParam::new(index, id);
            print(&client.documents().update(&param, &partial).await?)?;
        }
        Commands::DeleteDoc { index, id } => {
            let param = DeleteParam::new(index, id);
            print(&client.documents().delete_document(&param).await?)?;
        }
        Commands::Search {
            index,
            matches,
            terms,
            sort,
            from,
            size,
            terms_agg,
            avg_agg,
        } => {
            let query = build_query(matches, terms);
            let param = build_search(index, query, sort, from, size, terms_agg, avg_agg)?;
            tracing::debug!(body = %param.to_json(), "search request");
            print(&client.documents().search::<Value>(&param).await?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        let p = parse_property("title:text:ik_smart").unwrap();
        assert_eq!(p.analyzer(), Some("ik_smart"));
        let p = parse_property("tags:keyword").unwrap();
        assert_eq!(p.property_type(), PropertyType::Keyword);
        assert!(parse_property("loc:geo_point").is_err());
        assert!(parse_property("nocolon").is_err());
    }

    #[test]
    fn test_build_query() {
        assert!(build_query(vec![], vec![]).is_none());
        let single = build_query(vec![("title".into(), "rust".into())], vec![]).unwrap();
        assert!(matches!(single, Query::Match(_)));
        let both = build_query(
            vec![("title".into(), "rust".into())],
            vec![("year".into(), "2018".into())],
        )
        .unwrap();
        let json = both.to_json();
        assert_eq!(json["bool"]["must"][1]["term"]["year"]["value"], 2018);
    }

    #[test]
    fn test_build_search_aggs() {
        let param = build_search(
            "bank".into(),
            None,
            vec![("balance".into(), SortOrder::Desc)],
            0,
            10,
            vec!["by_state:state.keyword:5".into()],
            vec!["avg_balance:balance".into()],
        )
        .unwrap();
        let json = param.to_json();
        assert_eq!(json["aggs"]["by_state"]["terms"]["size"], 5);
        assert_eq!(json["aggs"]["avg_balance"]["avg"]["field"], "balance");
        let bad = build_search("bank".into(), None, vec![], 0, 10, vec!["bad".into()], vec![]);
        assert!(bad.is_err());
    }
}
