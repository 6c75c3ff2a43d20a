use console::style;
use std::fmt;
use vecset_core::error::VecsetError;

/// Error with context and suggestions for the terminal
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn catalog_not_found(path: &str) -> CliError {
    CliError::new("Catalog directory not found")
        .with_context(format!("Looked for datasets in: {}", path))
        .with_suggestion("Pass the catalog directory: vecset --catalog <DIR> list")
        .with_suggestion("Or set VECSET_CATALOG, or catalog_root in vecset.toml")
        .with_help("Run: vecset config")
}

pub fn dataset_not_found(name: &str) -> CliError {
    CliError::new(format!("Dataset not found: {}", name))
        .with_suggestion("List available datasets: vecset list")
        .with_help("Run: vecset show --help")
}

pub fn index_not_found(name: &str) -> CliError {
    CliError::new(format!("Index not found: {}", name))
        .with_context("The upload was asked not to create the index, and it does not exist.")
        .with_suggestion("Create the index first, or drop --no-create")
        .with_suggestion("Check the index name and the --service backend")
        .with_help("Run: vecset upload --help")
}

pub fn dimension_mismatch(index: &str, index_dim: usize, dataset_dim: usize) -> CliError {
    CliError::new("Dimension mismatch")
        .with_context(format!(
            "Index {} stores {}-dimensional vectors, but the dataset has {} dimensions.\n\nNo records were sent.",
            index, index_dim, dataset_dim
        ))
        .with_suggestion("Upload into a different index name, which will be created with the right dimension")
        .with_suggestion("Or pick a dataset embedded with a model of matching dimension")
}

pub fn missing_credentials(key: &str) -> CliError {
    CliError::new(format!("Missing required configuration: {}", key))
        .with_context("The index service credentials are read from the environment.")
        .with_suggestion("Set the API key: export PINECONE_API_KEY=...")
        .with_suggestion("Pod projects also need PINECONE_ENVIRONMENT")
        .with_suggestion("Or rehearse locally with --service memory")
}

pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check vecset.toml and VECSET_* environment variables")
        .with_help("Run: vecset config")
}

/// Map a library error onto a terminal error with suggestions
pub fn from_vecset(error: &VecsetError) -> CliError {
    match error {
        VecsetError::CatalogNotFound { path } => catalog_not_found(&path.display().to_string()),
        VecsetError::DatasetNotFound { name } => dataset_not_found(name),
        VecsetError::IndexNotFound { name } => index_not_found(name),
        VecsetError::DimensionMismatch {
            index,
            index_dim,
            dataset_dim,
        } => dimension_mismatch(index, *index_dim, *dataset_dim),
        VecsetError::ConfigMissing { key } => missing_credentials(key),
        VecsetError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        VecsetError::UploadAborted { source, outcome } => {
            let mut err = CliError::new("Upload aborted").with_context(format!(
                "{} of {} records acknowledged, {} batches failed.\n\nFirst error: {}",
                outcome.total_acknowledged,
                outcome.total_records,
                outcome.failure_count(),
                source
            ));
            if source.to_string().contains("authentication failed") {
                err = err.with_suggestion("Check PINECONE_API_KEY");
            }
            err.with_suggestion("Re-running the upload is safe: records are overwritten by id")
        }
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(vecset) = error.downcast_ref::<VecsetError>() {
        return from_vecset(vecset);
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(format!("{:#}", error))
    }
}
