use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tessera_retrieval::{Corpus, RetrievalConfig, load_output_dir};
use tessera_store::{Triple, VectorIndex};

const DEFAULT_CONFIG: &str = "tessera.toml";
const PREVIEW_COMPONENTS: usize = 10;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(version)]
#[command(about = "Inspect tessera indexes, feeds and configuration", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "TESSERA_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print size, dimension and leading rows of a persisted vector index
    Inspect {
        index: PathBuf,

        /// Rows to preview
        #[arg(short, long, default_value_t = 3)]
        rows: usize,
    },

    /// Build the knowledge graph from an ingestion feed directory and print it
    Graph {
        feed: PathBuf,

        /// Emit Graphviz DOT instead of one edge per line
        #[arg(long, conflicts_with = "from")]
        dot: bool,

        /// Only list edges leaving this node
        #[arg(long)]
        from: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RetrievalConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    config.validate().context("invalid configuration")?;

    let output = match cli.command {
        Command::Inspect { index, rows } => inspect(&index, rows)?,
        Command::Graph { feed, dot, from } => graph(&feed, &config, dot, from.as_deref())?,
        Command::Config => toml::to_string_pretty(&config).context("failed to render config")?,
    };
    print!("{output}");
    Ok(())
}

fn inspect(path: &Path, rows: usize) -> anyhow::Result<String> {
    let index = VectorIndex::load(path)
        .with_context(|| format!("failed to load index from {}", path.display()))?;
    Ok(describe_index(&index, rows))
}

fn graph(
    feed: &Path,
    config: &RetrievalConfig,
    dot: bool,
    from: Option<&str>,
) -> anyhow::Result<String> {
    let records = load_output_dir(feed)
        .with_context(|| format!("failed to read feed directory {}", feed.display()))?;
    let corpus = Corpus::build(records, config.chunker()?)?;
    let graph = corpus.graph();
    if dot {
        return Ok(graph.to_dot());
    }
    match from {
        Some(name) => {
            anyhow::ensure!(graph.contains_node(name), "no node named {name:?} in the graph");
            Ok(list_edges(&graph.outgoing(name)))
        }
        None => Ok(list_edges(&graph.edges())),
    }
}

fn describe_index(index: &VectorIndex, rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ntotal: {}", index.len());
    match index.dimension() {
        Some(d) => {
            let _ = writeln!(out, "dimension: {d}");
        }
        None => {
            let _ = writeln!(out, "dimension: unset");
        }
    }
    for (row, vector) in index.reconstruct_n(0, rows).into_iter().enumerate() {
        let head: Vec<String> = vector
            .iter()
            .take(PREVIEW_COMPONENTS)
            .map(|x| format!("{x:.4}"))
            .collect();
        let _ = writeln!(out, "row {row}: [{}]", head.join(", "));
    }
    out
}

fn list_edges(edges: &[Triple]) -> String {
    let mut out = String::new();
    for edge in edges {
        let _ = writeln!(out, "{} -[{}]-> {}", edge.subject, edge.relation, edge.object);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_index_rows() {
        let index = VectorIndex::build([[0.5_f32, 1.0], [2.0, 0.25]]).unwrap();
        assert_eq!(
            describe_index(&index, 1),
            "ntotal: 2\ndimension: 2\nrow 0: [0.5000, 1.0000]\n"
        );
    }

    #[test]
    fn describes_empty_index() {
        assert_eq!(
            describe_index(&VectorIndex::new(), 3),
            "ntotal: 0\ndimension: unset\n"
        );
    }

    #[test]
    fn preview_truncates_components() {
        let index = VectorIndex::build([vec![1.0_f32; 16]]).unwrap();
        let out = describe_index(&index, 5);
        assert_eq!(out.lines().last().unwrap().matches("1.0000").count(), 10);
    }

    #[test]
    fn inspect_reads_persisted_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.tsrx");
        VectorIndex::build([[1.0_f32, 2.0, 3.0]])
            .unwrap()
            .save(&path)
            .unwrap();
        assert!(inspect(&path, 1).unwrap().starts_with("ntotal: 1\ndimension: 3\n"));
    }

    #[test]
    fn inspect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(inspect(&dir.path().join("absent.tsrx"), 1).is_err());
    }

    #[test]
    fn graph_lists_feed_triples() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("knowledge_graph_triples.json"),
            r#"[{"subject": "A", "relation": "reports_to", "object": "B"},
                {"subject": "B", "relation": "reports_to", "object": "C"}]"#,
        )
        .unwrap();
        let config = RetrievalConfig::default();
        let out = graph(dir.path(), &config, false, None).unwrap();
        assert_eq!(out, "A -[reports_to]-> B\nB -[reports_to]-> C\n");

        let from_b = graph(dir.path(), &config, false, Some("B")).unwrap();
        assert_eq!(from_b, "B -[reports_to]-> C\n");
        assert_eq!(graph(dir.path(), &config, false, Some("C")).unwrap(), "");
        assert!(graph(dir.path(), &config, false, Some("Z")).is_err());

        let dot = graph(dir.path(), &config, true, None).unwrap();
        assert!(dot.starts_with("digraph"));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["tessera", "graph", "out", "--dot"]).unwrap();
        assert!(matches!(cli.command, Command::Graph { dot: true, from: None, .. }));

        let cli = Cli::try_parse_from(["tessera", "graph", "out", "--from", "A"]).unwrap();
        assert!(matches!(cli.command, Command::Graph { from: Some(ref n), .. } if n == "A"));
        assert!(Cli::try_parse_from(["tessera", "graph", "out", "--dot", "--from", "A"]).is_err());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
    }
}
