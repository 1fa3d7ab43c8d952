//! Display logic for the whois-check CLI.
//!
//! Colored result lines, the spinner shown while a batch runs, the TLD
//! listing and the closing summary. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use whois_check_lib::{DomainResult, LookupStatus, Registry};

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner with `message`, or return `None` when stderr is not a
    /// terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a dim header line at the start of a verbose run.
pub fn print_header(domain_count: usize, concurrency: usize, tld_count: usize) {
    println!(
        "{} {} {}",
        style("whois-check").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "| {} domain{} | {} TLDs known | concurrency {}",
            domain_count,
            plural(domain_count),
            tld_count,
            concurrency
        ))
        .dim(),
    );
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Print one domain result with colors and alignment.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is
/// shown. With `show_info`, taken domains are followed by their WHOIS text.
pub fn print_result(
    result: &DomainResult,
    show_info: bool,
    debug: bool,
    counter: Option<(usize, usize)>,
) {
    let padded_domain = pad_str(&result.domain, 30, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    let label = status_label(result.status);
    let styled_label = match result.status {
        LookupStatus::Available => style(label).green().bold(),
        LookupStatus::Premium => style(label).cyan().bold(),
        LookupStatus::Unavailable => style(label).red().bold(),
        LookupStatus::Error | LookupStatus::Unresolved => style(label).yellow(),
        LookupStatus::Unsupported => style(label).dim(),
    };

    match brief_error(result) {
        Some(reason) => println!(
            "  {}{}  {}  {}",
            prefix,
            style(&padded_domain).white(),
            styled_label,
            style(reason).dim(),
        ),
        None => println!(
            "  {}{}  {}",
            prefix,
            style(&padded_domain).white(),
            styled_label,
        ),
    }

    if show_info {
        if let Some(whois) = &result.whois {
            for line in whois_for_terminal(whois).lines() {
                println!("      {}", style(line).dim());
            }
        }
    }

    if debug {
        if let Some(duration) = result.check_duration {
            println!(
                "    {} Checked in {}ms via {}",
                style("└─").dim(),
                duration.as_millis(),
                result.method_used,
            );
        }
    }
}

/// Fixed-width status label.
pub fn status_label(status: LookupStatus) -> String {
    format!("{:<11}", status.to_string())
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Running counts by status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub available: usize,
    pub premium: usize,
    pub taken: usize,
    pub failed: usize,
    pub unsupported: usize,
}

impl Tally {
    pub fn add(&mut self, result: &DomainResult) {
        match result.status {
            LookupStatus::Available => self.available += 1,
            LookupStatus::Premium => self.premium += 1,
            LookupStatus::Unavailable => self.taken += 1,
            LookupStatus::Error | LookupStatus::Unresolved => self.failed += 1,
            LookupStatus::Unsupported => self.unsupported += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.available + self.premium + self.taken + self.failed + self.unsupported
    }
}

impl<'a> FromIterator<&'a DomainResult> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a DomainResult>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for result in iter {
            tally.add(result);
        }
        tally
    }
}

/// Print the final summary bar with colored counts.
pub fn print_summary(tally: &Tally, duration: Duration) {
    let total = tally.total();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );

    let mut parts = vec![
        style(format!("{} available", tally.available)).green().to_string(),
        style(format!("{} taken", tally.taken)).red().to_string(),
    ];
    if tally.premium > 0 {
        parts.push(style(format!("{} premium", tally.premium)).cyan().to_string());
    }
    if tally.failed > 0 {
        parts.push(style(format!("{} failed", tally.failed)).yellow().to_string());
    }
    if tally.unsupported > 0 {
        parts.push(
            style(format!("{} unsupported", tally.unsupported))
                .dim()
                .to_string(),
        );
    }

    let separator = format!("  {}  ", style("|").dim());
    println!(
        "  {} domain{} in {:.1}s{}{}",
        style(total).bold(),
        plural(total),
        duration.as_secs_f64(),
        separator,
        parts.join(separator.as_str()),
    );
}

// ── TLD listing ──────────────────────────────────────────────────────────────

/// Print every TLD in the registry with its lookup method.
pub fn print_tlds(registry: &Registry) {
    let heading = console::Style::new().yellow().bold();
    println!();
    println!(
        "{}",
        heading.apply_to(format!("Supported TLDs ({}):", registry.len()))
    );
    println!();

    for tld in registry.tlds() {
        let method = match registry.is_socket_lookup(&tld) {
            Ok(true) => "WHOIS",
            Ok(false) => "HTTP",
            Err(_) => "unresolved",
        };
        println!(
            "  {}  {}",
            style(pad_str(&tld, 16, Alignment::Left, None)).green(),
            style(method).dim(),
        );
    }
    println!();
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Short reason shown next to results that carry no availability answer.
fn brief_error(result: &DomainResult) -> Option<String> {
    match result.status {
        LookupStatus::Error => Some(format!(
            "({})",
            result.error_message.as_deref().unwrap_or("network error")
        )),
        LookupStatus::Unsupported => Some("(no WHOIS server known for this TLD)".to_string()),
        LookupStatus::Unresolved => Some(format!(
            "({})",
            result.error_message.as_deref().unwrap_or("lookup not possible")
        )),
        _ => None,
    }
}

/// Turn sanitized WHOIS text back into plain terminal text.
pub fn whois_for_terminal(text: &str) -> String {
    text.replace("<br />", "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use whois_check_lib::CheckMethod;

    fn make_result(domain: &str, status: LookupStatus) -> DomainResult {
        DomainResult {
            domain: domain.to_string(),
            status,
            tld_known: status != LookupStatus::Unsupported,
            whois: None,
            error_message: None,
            check_duration: None,
            method_used: CheckMethod::Socket,
        }
    }

    #[test]
    fn test_tally_counts_by_status() {
        let results = [
            make_result("a.com", LookupStatus::Available),
            make_result("b.com", LookupStatus::Available),
            make_result("c.com", LookupStatus::Unavailable),
            make_result("d.xyz", LookupStatus::Premium),
            make_result("e.com", LookupStatus::Error),
            make_result("f.com", LookupStatus::Unresolved),
            make_result("g.nope", LookupStatus::Unsupported),
        ];

        let tally: Tally = results.iter().collect();
        assert_eq!(
            tally,
            Tally {
                available: 2,
                premium: 1,
                taken: 1,
                failed: 2,
                unsupported: 1,
            }
        );
        assert_eq!(tally.total(), 7);
    }

    #[test]
    fn test_brief_error() {
        let mut failed = make_result("a.com", LookupStatus::Error);
        failed.error_message = Some("Error: 111 - Connection refused".to_string());
        assert_eq!(
            brief_error(&failed).as_deref(),
            Some("(Error: 111 - Connection refused)")
        );

        let unsupported = make_result("a.nope", LookupStatus::Unsupported);
        assert!(brief_error(&unsupported).unwrap().contains("no WHOIS server"));

        assert_eq!(brief_error(&make_result("a.com", LookupStatus::Available)), None);
    }

    #[test]
    fn test_whois_for_terminal() {
        assert_eq!(
            whois_for_terminal("Registrar: &lt;Acme &amp; Co&gt;<br />\r\nStatus: &quot;ok&quot;"),
            "Registrar: <Acme & Co>\r\nStatus: \"ok\""
        );
        assert_eq!(whois_for_terminal("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_status_label_is_fixed_width() {
        assert_eq!(status_label(LookupStatus::Available), "AVAILABLE  ");
        assert_eq!(status_label(LookupStatus::Unsupported), "UNSUPPORTED");
    }
}
