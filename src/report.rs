//! Renders the blocking request handed to the service desk. Rendering only:
//! whether the text goes out by mail or is pasted from stdout is the
//! operator's business.

use crate::config::MailConfig;
use crate::results::Results;

const PATHS_INTRO: &str = "Please add the following to the list of blocked filenames:";
const URLS_INTRO: &str = "Please add the following to the list of blocked URLs on the proxy:";

pub fn render(mail: &MailConfig, results: &Results) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Subject: {}\nTo: {}\nCc: {}\nX-Contact-Info: {}\n\n",
        mail.subject, mail.to, mail.cc, mail.from
    ));
    out.push_str("Dear Service Desk,\n\n");

    let files = sorted(&results.files);
    out.push_str(&format!(
        "After reading the following files received from CERT-EU:\n  {}\n\n",
        files.join(", ")
    ));

    for (intro, entries) in [(PATHS_INTRO, &results.paths), (URLS_INTRO, &results.urls)] {
        if entries.is_empty() {
            continue;
        }
        out.push_str(intro);
        out.push('\n');
        for entry in sorted(entries) {
            out.push_str("  ");
            out.push_str(&entry);
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Best regards,\n--\nYour friendly script - {}/{}\n",
        crate::NAME,
        crate::VERSION
    ));
    out
}

fn sorted(set: &rustc_hash::FxHashSet<String>) -> Vec<String> {
    let mut v: Vec<String> = set.iter().cloned().collect();
    v.sort();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> MailConfig {
        MailConfig {
            from: "cert@example.org".to_string(),
            to: "servicedesk@example.org".to_string(),
            cc: "soc@example.org".to_string(),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_render_full_report() {
        let mut results = Results::new();
        results.add_file("CIMBL-0666-CERTS.csv");
        results.add_path("malware.docx");
        results.add_url("http://example.com/p.php");

        let text = render(&mail(), &results);

        assert!(text.contains("Subject: Blocking request"));
        assert!(text.contains("To: servicedesk@example.org"));
        assert!(text.contains("CIMBL-0666-CERTS.csv"));
        assert!(text.contains(PATHS_INTRO));
        assert!(text.contains("  malware.docx\n"));
        assert!(text.contains(URLS_INTRO));
        assert!(text.contains("  http://example.com/p.php\n"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut results = Results::new();
        results.add_file("CIMBL-0666-CERTS.csv");
        results.add_url("http://example.com/p.php");

        let text = render(&mail(), &results);
        assert!(!text.contains(PATHS_INTRO));
        assert!(text.contains(URLS_INTRO));
    }

    #[test]
    fn test_entries_are_sorted() {
        let mut results = Results::new();
        results.add_url("http://b.example.com/");
        results.add_url("http://a.example.com/");

        let text = render(&mail(), &results);
        let a = text.find("http://a.example.com/").unwrap();
        let b = text.find("http://b.example.com/").unwrap();
        assert!(a < b);
    }
}
