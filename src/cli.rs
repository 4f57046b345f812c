// src/cli.rs
// =============================================================================
// Command-line interface and run configuration.
//
// The clap derive struct mirrors the flags one-to-one; Cli::into_config()
// turns it into the immutable CrawlConfig the walker uses, compiling the
// regex patterns and resolving the credentials up front. Every configuration
// problem (bad pattern, conflicting mirror flags, missing password file,
// missing mirror directory) is reported here, before any network activity.
// =============================================================================

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use regex::Regex;
use url::Url;

use crate::urls::clean_url;

#[derive(Parser, Debug)]
#[command(
    name = "webwalk",
    version,
    about = "Recursively walk a web site and report the pages it links to",
    long_about = "webwalk recursively walks over the pages of a web site and reports the \
                  links to other pages as defined by href and src attributes. It is useful \
                  for understanding how a site is laid out, for finding bad links, and for \
                  creating a full or partial local mirror based on the filtering options."
)]
pub struct Cli {
    /// The URL to walk.
    pub url: String,

    /// Copy all filtered files into a single flat directory.
    ///
    /// Useful for collecting data or package files that have unique names.
    /// Without a filter, everything ends up in one directory.
    #[arg(short = 'c', long, value_name = "DIR")]
    pub copy: Option<PathBuf>,

    /// The maximum depth to search. 0 means no maximum.
    #[arg(short = 'd', long, value_name = "INT", default_value_t = 0)]
    pub depth: usize,

    /// Display debugging information.
    ///
    /// Useful for working out regex patterns.
    #[arg(long)]
    pub debug: bool,

    /// Exclude URLs that match this regex pattern. May be repeated.
    ///
    /// Affects the search itself, not just the output.
    #[arg(short = 'e', long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Only report results that match this regex pattern. May be repeated.
    ///
    /// Limits what is displayed or mirrored without affecting the search.
    /// By default all results are displayed.
    #[arg(short = 'f', long, value_name = "PATTERN")]
    pub filter: Vec<String>,

    /// Only search URLs that match all of these regex patterns. May be
    /// repeated. Affects the search itself; use with care.
    #[arg(short = 'i', long, value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Indent each reported URL by its depth in the page hierarchy.
    ///
    /// Use -s to change the number of spaces per level. Indentation does not
    /// combine well with filters because the parents are usually filtered
    /// out.
    #[arg(short = 'I', long)]
    pub indent: bool,

    /// Emit the report as a JSON array instead of per-line text.
    #[arg(long)]
    pub json: bool,

    /// Disable warnings.
    #[arg(short = 'n', long)]
    pub no_warnings: bool,

    /// A file that contains the password.
    #[arg(short = 'p', long, value_name = "FILE")]
    pub password_file: Option<PathBuf>,

    /// The password.
    ///
    /// Prefer --password-file in scripts: command-line arguments are visible
    /// in the shell history.
    #[arg(short = 'P', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Replicate the site contents locally under DIR, reproducing the site's
    /// path structure. The directory must already exist.
    #[arg(short = 'r', long, value_name = "DIR")]
    pub replicate: Option<PathBuf>,

    /// Report relative URL paths.
    ///
    /// Typically only useful together with -I, and may produce odd output
    /// when there are many links to external sites.
    #[arg(short = 'R', long)]
    pub relurl: bool,

    /// The number of spaces to indent per level when -I is given.
    #[arg(short = 's', long, value_name = "INT", default_value_t = 3)]
    pub spaces_per_indent: usize,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub timeout: u64,

    /// The user name for HTTP basic authentication.
    ///
    /// If neither -p nor -P supplies a password, the user is prompted for
    /// one.
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Increase the level of verbosity.
    ///
    /// -v shows the content length, -vv adds the content type, -vvv adds
    /// the raw response headers.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// HTTP basic auth credentials resolved from the CLI options.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Where mirrored content goes, if anywhere.
#[derive(Debug, Clone, Default)]
pub enum MirrorMode {
    #[default]
    None,
    /// Reproduce the site's path structure under this directory.
    Replicate(PathBuf),
    /// Drop every matched file into this directory by basename only.
    Copy(PathBuf),
}

/// Immutable configuration for one run of the walker.
#[derive(Debug, Default)]
pub struct CrawlConfig {
    /// The canonical form of the root URL; replicate paths are computed
    /// relative to it.
    pub root_url: String,
    /// 0 means unlimited.
    pub max_depth: usize,
    pub exclude: Vec<Regex>,
    pub include: Vec<Regex>,
    pub filter: Vec<Regex>,
    pub mirror: MirrorMode,
    pub indent: bool,
    pub spaces_per_indent: usize,
    pub relurl: bool,
    pub verbose: u8,
    pub json: bool,
    pub no_warnings: bool,
    pub timeout: Duration,
    pub auth: Option<Credentials>,
}

impl Cli {
    /// Validate the options and build the run configuration.
    pub fn into_config(self) -> Result<CrawlConfig> {
        Url::parse(&self.url).with_context(|| format!("invalid URL '{}'", self.url))?;

        let exclude = compile_patterns(&self.exclude, "exclude")?;
        let include = compile_patterns(&self.include, "include")?;
        let filter = compile_patterns(&self.filter, "filter")?;

        let auth = self.resolve_credentials()?;
        let mirror = self.resolve_mirror()?;

        Ok(CrawlConfig {
            root_url: clean_url(&self.url),
            max_depth: self.depth,
            exclude,
            include,
            filter,
            mirror,
            indent: self.indent,
            spaces_per_indent: self.spaces_per_indent,
            relurl: self.relurl,
            verbose: self.verbose,
            json: self.json,
            no_warnings: self.no_warnings,
            timeout: Duration::from_secs(self.timeout),
            auth,
        })
    }

    /// Work out the username/password pair, prompting on the terminal when a
    /// username was given without a password.
    fn resolve_credentials(&self) -> Result<Option<Credentials>> {
        if self.password.is_some() && self.password_file.is_some() {
            bail!("the arguments --password (-P) and --password-file (-p) are mutually exclusive");
        }

        let mut password = self.password.clone();
        if let Some(file) = &self.password_file {
            if !file.exists() {
                bail!("password file does not exist: {}", file.display());
            }
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("cannot read password file {}", file.display()))?;
            password = Some(contents.trim().to_string());
        }

        match (&self.username, password) {
            (Some(username), Some(password)) => Ok(Some(Credentials {
                username: username.clone(),
                password,
            })),
            (Some(username), None) => {
                let password = prompt_password(username)?;
                Ok(Some(Credentials {
                    username: username.clone(),
                    password,
                }))
            }
            (None, Some(_)) => {
                bail!("username must be specified when a password is specified")
            }
            (None, None) => Ok(None),
        }
    }

    /// Validate the mirror options: replicate and copy are mutually
    /// exclusive and the target directory must already exist.
    fn resolve_mirror(&self) -> Result<MirrorMode> {
        match (&self.replicate, &self.copy) {
            (Some(_), Some(_)) => {
                bail!("cannot specify concurrent copy and replication operations")
            }
            (Some(dir), None) => {
                if !dir.is_dir() {
                    bail!("replication directory does not exist: {}", dir.display());
                }
                Ok(MirrorMode::Replicate(dir.clone()))
            }
            (None, Some(dir)) => {
                if !dir.is_dir() {
                    bail!("copy directory does not exist: {}", dir.display());
                }
                Ok(MirrorMode::Copy(dir.clone()))
            }
            (None, None) => Ok(MirrorMode::None),
        }
    }
}

fn compile_patterns(patterns: &[String], kind: &str) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .with_context(|| format!("invalid {} pattern '{}'", kind, pattern))
        })
        .collect()
}

/// Ask the operator for the password on the controlling terminal.
fn prompt_password(username: &str) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "Password for {}? ", username)?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("cannot read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
