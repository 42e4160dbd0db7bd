use clap::{Args, Parser, Subcommand, ValueEnum};
use pkg_constants::api::KUBECTL_PROXY_URL;
use pkg_constants::paths::{CONFIG_DIR_NAME, CONFIG_FILENAME, DEFAULT_OUTPUT_FILENAME};
use pkg_discovery::ClientOptions;
use pkg_session::AppState;
use pkg_types::config::{RbacgenConfigFile, load_config_file};
use pkg_types::rbac::SubjectKind;
use pkg_types::selection::{Scope, Selection, SubjectRef, Verb};
use pkg_types::validate::validate_name;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rbacgen",
    about = "Assemble Kubernetes RBAC manifests from a cluster's discovery API"
)]
struct Cli {
    /// Kubernetes API endpoint (e.g. `kubectl proxy` on http://localhost:8001)
    #[arg(long)]
    server: Option<String>,

    /// Path to YAML config file
    #[arg(long, short)]
    config: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log line format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List grantable resources (CRDs, core v1, preferred group versions)
    Resources,
    /// List namespaces
    Namespaces,
    /// Suggest subject names of a kind
    Subjects {
        /// ServiceAccount, User or Group
        #[arg(long)]
        kind: SubjectKind,
        /// Namespace to list service accounts from
        #[arg(long, short, default_value = "default")]
        namespace: String,
    },
    /// List the verbs that can be granted
    Verbs,
    /// Generate Role/ClusterRole + binding YAML
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Generate a ClusterRole/ClusterRoleBinding instead of per-namespace Roles
    #[arg(long)]
    cluster: bool,

    /// Namespace to grant in (repeatable; default: "default")
    #[arg(long = "namespace", short = 'n')]
    namespaces: Vec<String>,

    /// Resource id `group/version/resource`, core group empty: `/v1/pods` (repeatable)
    #[arg(long = "resource", short = 'r')]
    resources: Vec<String>,

    /// Verb to grant (repeatable; default from config or get, list, watch)
    #[arg(long = "verb")]
    verbs: Vec<Verb>,

    /// Subject kind
    #[arg(long, default_value = "ServiceAccount")]
    subject_kind: SubjectKind,

    /// Subject name
    #[arg(long)]
    subject: String,

    /// Namespace of a ServiceAccount subject
    #[arg(long, default_value = "default")]
    subject_namespace: String,

    /// Write the YAML to this file instead of stdout (`-o` alone: rbac.yaml)
    #[arg(long, short, num_args = 0..=1, default_missing_value = DEFAULT_OUTPUT_FILENAME)]
    output: Option<String>,
}

/// Settings after merging CLI flags over the config file.
struct Settings {
    server: Option<String>,
    default_verbs: Vec<String>,
    output: Option<String>,
    config_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let file_cfg: RbacgenConfigFile = load_config_file(&config_path)?;
    info!("Config file: {}", config_path);

    // Merge: CLI args > config file > defaults
    let options = ClientOptions {
        timeout: cli.timeout_secs.or(file_cfg.timeout_secs).map(Duration::from_secs),
        insecure: cli.insecure || file_cfg.insecure.unwrap_or(false),
    };
    let settings = Settings {
        server: cli.server.clone().or(file_cfg.server).filter(|s| !s.trim().is_empty()),
        default_verbs: file_cfg.verbs.unwrap_or_default(),
        output: file_cfg.output,
        config_path,
    };

    let state = AppState::new(options);
    if let Some(server) = &settings.server {
        state.set_base_url(server).await?;
    }

    match cli.command {
        Commands::Resources => cmd_resources(&state, &settings).await,
        Commands::Namespaces => cmd_namespaces(&state, &settings).await,
        Commands::Subjects { kind, namespace } => {
            cmd_subjects(&state, &settings, kind, &namespace).await
        }
        Commands::Verbs => {
            for verb in Verb::ALL {
                println!("{}", verb);
            }
            Ok(())
        }
        Commands::Generate(args) => cmd_generate(&state, &settings, args).await,
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILENAME)
        .to_string_lossy()
        .into_owned()
}

fn require_server(settings: &Settings) -> anyhow::Result<()> {
    if settings.server.is_none() {
        anyhow::bail!(
            "no API endpoint configured: pass --server or set `server` in {} \
             (for local use run `kubectl proxy --port=8001` and use {})",
            settings.config_path,
            KUBECTL_PROXY_URL
        );
    }
    Ok(())
}

// ── Discovery commands ──────────────────────────────────────────────────

async fn cmd_resources(state: &AppState, settings: &Settings) -> anyhow::Result<()> {
    require_server(settings)?;
    info!("Discovering resources from {}", state.base_url().await);
    state.refresh_catalog().await?;

    let catalog = state.catalog().await;
    println!("{:<56} {:<11} {}", "ID", "NAMESPACED", "SOURCE");
    for entry in &catalog {
        println!("{:<56} {:<11} {}", entry.id, entry.namespaced, entry.source);
    }
    if catalog.is_empty() {
        println!("(no resources discovered)");
    }

    let warnings = state.catalog_warnings().await;
    if warnings > 0 {
        eprintln!(
            "Warning: {} discovery source(s) failed; the list may be incomplete",
            warnings
        );
    }
    Ok(())
}

async fn cmd_namespaces(state: &AppState, settings: &Settings) -> anyhow::Result<()> {
    require_server(settings)?;
    let Some(client) = state.client().await else {
        return Ok(());
    };
    let namespaces = pkg_discovery::subjects::namespace_details(&client).await?;

    println!("{:<40} {}", "NAME", "CREATED");
    for ns in &namespaces {
        let created = ns
            .creation_timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<40} {}", ns.name, created);
    }
    if namespaces.is_empty() {
        println!("(no namespaces)");
    }
    Ok(())
}

async fn cmd_subjects(
    state: &AppState,
    settings: &Settings,
    kind: SubjectKind,
    namespace: &str,
) -> anyhow::Result<()> {
    require_server(settings)?;
    if kind == SubjectKind::ServiceAccount {
        validate_name(namespace)?;
    }
    state.refresh_subjects(kind, namespace).await?;

    let suggestions = state.subject_suggestions().await;
    for name in &suggestions.names {
        println!("{}", name);
    }
    if suggestions.names.is_empty() {
        println!("(no {} suggestions)", kind);
    }
    Ok(())
}

// ── Generate ────────────────────────────────────────────────────────────

async fn cmd_generate(
    state: &AppState,
    settings: &Settings,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    let selection = build_selection(&args, &settings.default_verbs)?;

    if selection.resource_ids.is_empty() {
        info!("No resources selected; granting on all resources");
    } else if settings.server.is_some() {
        state.refresh_catalog().await?;
        let catalog = state.catalog().await;
        for id in &selection.resource_ids {
            if !catalog.iter().any(|e| &e.id == id) {
                warn!("resource '{}' is not served by the cluster; dropped", id);
            }
        }
    } else {
        warn!("No API endpoint configured; resources cannot be resolved and all resources will be granted");
    }

    if selection.scope == Scope::Namespaced && settings.server.is_some() {
        state.refresh_namespaces().await?;
        let known = state.namespaces().await;
        for ns in &selection.namespaces {
            if !known.contains(ns) {
                warn!("namespace '{}' does not exist on the cluster", ns);
            }
        }
    }

    let yaml = state.generate(&selection).await?;

    match args.output.or_else(|| settings.output.clone()) {
        Some(path) => state.write_yaml(&PathBuf::from(path)).await?,
        None => print!("{}", yaml),
    }
    Ok(())
}

/// Validate the generate flags and turn them into a [`Selection`].
fn build_selection(args: &GenerateArgs, default_verbs: &[String]) -> anyhow::Result<Selection> {
    if args.subject.trim().is_empty() {
        anyhow::bail!("--subject must not be blank");
    }

    let mut selection = Selection {
        scope: if args.cluster {
            Scope::Cluster
        } else {
            Scope::Namespaced
        },
        namespaces: Vec::new(),
        resource_ids: args.resources.iter().cloned().collect(),
        verbs: resolve_verbs(&args.verbs, default_verbs)?,
        subject: SubjectRef {
            kind: args.subject_kind,
            name: args.subject.clone(),
            namespace: None,
        },
    };

    if args.subject_kind == SubjectKind::ServiceAccount {
        validate_name(&args.subject_namespace)?;
        selection.subject.namespace = Some(args.subject_namespace.clone());
    }

    if !args.cluster {
        for ns in &args.namespaces {
            validate_name(ns)?;
            selection.add_namespace(ns);
        }
    } else if !args.namespaces.is_empty() {
        warn!("--namespace is ignored with --cluster");
    }

    Ok(selection)
}

fn resolve_verbs(flags: &[Verb], configured: &[String]) -> anyhow::Result<BTreeSet<Verb>> {
    if !flags.is_empty() {
        return Ok(flags.iter().copied().collect());
    }
    if !configured.is_empty() {
        return configured.iter().map(|v| v.parse::<Verb>()).collect();
    }
    Ok(Verb::DEFAULTS.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(subject: &str) -> GenerateArgs {
        GenerateArgs {
            cluster: false,
            namespaces: vec![],
            resources: vec![],
            verbs: vec![],
            subject_kind: SubjectKind::ServiceAccount,
            subject: subject.to_string(),
            subject_namespace: "default".to_string(),
            output: None,
        }
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "rbacgen",
            "--server",
            "http://localhost:8001",
            "generate",
            "--cluster",
            "--resource",
            "/v1/pods",
            "--verb",
            "get",
            "--verb",
            "list",
            "--subject-kind",
            "User",
            "--subject",
            "alice",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.cluster);
        assert_eq!(args.verbs, vec![Verb::Get, Verb::List]);
        assert_eq!(args.subject_kind, SubjectKind::User);
        assert!(args.output.is_none());
    }

    #[test]
    fn bare_output_flag_means_rbac_yaml() {
        let cli = Cli::try_parse_from(["rbacgen", "generate", "--subject", "sa1", "-o"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.output.as_deref(), Some("rbac.yaml"));
    }

    #[test]
    fn blank_subject_is_rejected() {
        assert!(build_selection(&args("  "), &[]).is_err());
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let mut a = args("sa1");
        a.namespaces = vec!["Not_A_Label".to_string()];
        assert!(build_selection(&a, &[]).is_err());
    }

    #[test]
    fn verbs_fall_back_to_config_then_defaults() {
        let from_config = resolve_verbs(&[], &["create".to_string()]).unwrap();
        assert_eq!(from_config, BTreeSet::from([Verb::Create]));

        let defaults = resolve_verbs(&[], &[]).unwrap();
        assert_eq!(defaults, BTreeSet::from(Verb::DEFAULTS));

        assert!(resolve_verbs(&[], &["escalate".to_string()]).is_err());
    }

    #[test]
    fn service_account_subject_carries_its_namespace() {
        let mut a = args("sa1");
        a.subject_namespace = "dev".to_string();
        a.namespaces = vec!["dev".into(), "staging".into(), "dev".into()];
        let sel = build_selection(&a, &[]).unwrap();
        assert_eq!(sel.subject.namespace.as_deref(), Some("dev"));
        assert_eq!(sel.namespaces, vec!["dev", "staging"]);
    }

    #[test]
    fn user_subject_has_no_namespace() {
        let mut a = args("alice");
        a.subject_kind = SubjectKind::User;
        a.cluster = true;
        a.namespaces = vec!["dev".into()];
        let sel = build_selection(&a, &[]).unwrap();
        assert_eq!(sel.scope, Scope::Cluster);
        assert!(sel.subject.namespace.is_none());
        assert!(sel.namespaces.is_empty());
    }
}
