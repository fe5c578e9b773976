//! The `show` orchestrator
//!
//! Labels are recovered by the first strategy that yields any: history, then
//! static source, then any custom providers. When all come back empty the
//! scope matcher names what it can and the rest get the placeholder.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::config::ShowConfig;
use crate::context::{CallSite, Probe, Scope};
use crate::error::ShowError;
use crate::extract::{extract, CallQuery};
use crate::history::{history_labels, FileHistory, HistoryProvider};
use crate::matcher::match_names;
use crate::source::SourceLoader;
use crate::PLACEHOLDER;

/// What a label provider is asked about
#[derive(Debug, Clone, Copy)]
pub struct LabelRequest<'a> {
    pub site: &'a CallSite,
    /// Macro/function name to look for
    pub target: &'a str,
}

/// A strategy that recovers argument texts for a call.
///
/// An empty result means "try the next strategy"; providers never fail.
pub trait LabelProvider: Send + Sync {
    fn name(&self) -> &str;

    fn labels(&self, request: &LabelRequest<'_>) -> Vec<String>;
}

/// Labels from the latest input of an interactive session
pub struct HistoryLabels {
    history: Box<dyn HistoryProvider>,
}

impl HistoryLabels {
    pub fn new(history: impl HistoryProvider + 'static) -> Self {
        Self {
            history: Box::new(history),
        }
    }
}

impl LabelProvider for HistoryLabels {
    fn name(&self) -> &str {
        "history"
    }

    fn labels(&self, request: &LabelRequest<'_>) -> Vec<String> {
        history_labels(self.history.as_ref(), request.target)
    }
}

/// Labels parsed out of the caller's source
#[derive(Debug, Clone, Default)]
pub struct SourceLabels {
    loader: SourceLoader,
}

impl SourceLabels {
    pub fn new(loader: SourceLoader) -> Self {
        Self { loader }
    }
}

impl LabelProvider for SourceLabels {
    fn name(&self) -> &str {
        "source"
    }

    fn labels(&self, request: &LabelRequest<'_>) -> Vec<String> {
        let site = request.site;
        for fragment in self.loader.acquire(site) {
            let query = CallQuery::new(request.target)
                .at_line(site.line as usize)
                .at_column(site.column as usize)
                .with_offsets(fragment.line_offset, fragment.column_offset);

            let labels = extract(&fragment.text, &query);
            if !labels.is_empty() {
                log::trace!("{} resolved from {:?} source", site, fragment.origin);
                return labels;
            }
        }
        Vec::new()
    }
}

/// Prints `label = value` lines for `show!` calls
pub struct Show {
    config: ShowConfig,
    history: Option<HistoryLabels>,
    source: SourceLabels,
    extra: Vec<Box<dyn LabelProvider>>,
    out: Mutex<Box<dyn Write + Send>>,
}

static GLOBAL: OnceLock<Show> = OnceLock::new();

impl Show {
    /// Default configuration, writing to stdout
    pub fn new() -> Self {
        Self::from_config(ShowConfig::default())
    }

    pub fn from_config(config: ShowConfig) -> Self {
        let loader = SourceLoader::new().with_roots(config.source_roots.iter().cloned());
        let history = config.history_path.as_ref().map(|path| {
            let file = FileHistory::open(path);
            let file = match config.history_session {
                Some(session) => file.pinned(session),
                None => file,
            };
            log::debug!("reading history from {}", file.path().display());
            HistoryLabels::new(file)
        });

        Self {
            config,
            history,
            source: SourceLabels::new(loader),
            extra: Vec::new(),
            out: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// The process-wide instance used by `show!` without `use`.
    ///
    /// Built from [`ShowConfig::from_env`] on first use unless one was
    /// installed earlier.
    pub fn global() -> &'static Show {
        GLOBAL.get_or_init(|| Show::from_config(ShowConfig::from_env()))
    }

    /// Install the process-wide instance. Fails once `global` was used or a
    /// previous install succeeded.
    pub fn install(show: Show) -> Result<(), ShowError> {
        GLOBAL.set(show).map_err(|_| ShowError::AlreadyInstalled)
    }

    /// Consult `history` before any other strategy
    pub fn with_history(mut self, history: impl HistoryProvider + 'static) -> Self {
        self.history = Some(HistoryLabels::new(history));
        self
    }

    /// Register in-memory source for a (usually synthetic) file name
    pub fn with_source(mut self, file: impl Into<String>, text: impl Into<String>) -> Self {
        self.source.loader.register(file, text);
        self
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source.loader = self.source.loader.with_roots([root.into()]);
        self
    }

    /// Add a strategy tried after history and source, before name matching
    pub fn with_provider(mut self, provider: impl LabelProvider + 'static) -> Self {
        self.extra.push(Box::new(provider));
        self
    }

    pub fn with_writer(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Mutex::new(Box::new(out));
        self
    }

    pub fn config(&self) -> &ShowConfig {
        &self.config
    }

    /// Strategies in the order they are tried
    fn providers(&self) -> Vec<&dyn LabelProvider> {
        let mut providers: Vec<&dyn LabelProvider> = Vec::with_capacity(2 + self.extra.len());
        if let Some(history) = &self.history {
            providers.push(history);
        }
        providers.push(&self.source);
        for provider in &self.extra {
            providers.push(provider.as_ref());
        }
        providers
    }

    /// One label per probe
    pub fn labels(&self, site: &CallSite, scope: &Scope, probes: &[Probe<'_>]) -> Vec<String> {
        if probes.is_empty() {
            return Vec::new();
        }

        let request = LabelRequest {
            site,
            target: &self.config.target,
        };
        for provider in self.providers() {
            let mut labels = provider.labels(&request);
            if labels.is_empty() {
                log::trace!("{}: {} strategy yielded nothing", site, provider.name());
                continue;
            }
            log::debug!("{}: labels from {} strategy", site, provider.name());
            labels.resize(probes.len(), PLACEHOLDER.to_string());
            return labels;
        }

        log::debug!("{}: falling back to scope matching", site);
        match_names(probes.iter().map(Probe::handle), scope)
    }

    /// Print one `label = value` line per probe
    pub fn emit(&self, site: &CallSite, scope: &Scope, probes: &[Probe<'_>]) {
        if probes.is_empty() {
            return;
        }

        let labels = self.labels(site, scope, probes);
        let rendered = self.render(&labels, probes);

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(rendered.as_bytes()).and_then(|_| out.flush()) {
            log::warn!("cannot write shown values: {}", e);
        }
    }

    fn render(&self, labels: &[String], probes: &[Probe<'_>]) -> String {
        let mut rendered = String::new();
        for (label, probe) in labels.iter().zip(probes) {
            let _ = if self.config.pretty {
                writeln!(rendered, "{} = {:#?}", label, probe.value())
            } else {
                writeln!(rendered, "{} = {:?}", label, probe.value())
            };
        }
        rendered
    }
}

impl Default for Show {
    fn default() -> Self {
        Self::new()
    }
}
