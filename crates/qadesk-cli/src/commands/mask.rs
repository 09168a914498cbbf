use anyhow::Result;
use qadesk_security::{MaskReport, MaskingEngine};
use tokio::io::AsyncReadExt;

pub async fn handle(text: Vec<String>, report: bool) -> Result<()> {
    let input = if text.is_empty() {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        text.join(" ")
    };

    let masked = MaskingEngine::new().mask_with_report(&input);
    println!("{}", masked.text);

    if report {
        eprint!("{}", format_report(&masked));
    }

    Ok(())
}

fn format_report(report: &MaskReport) -> String {
    let mut out = String::new();
    if report.redactions.is_empty() {
        out.push_str("No sensitive data found.\n");
    } else {
        out.push_str(&format!("✓ Masked {} item(s)\n", report.total()));
        for redaction in &report.redactions {
            out.push_str(&format!("  {}: {}\n", redaction.category, redaction.count));
        }
    }

    for degraded in &report.degraded {
        out.push_str(&format!(
            "  ! {} at offset {} left unmasked: {}\n",
            degraded.category, degraded.offset, degraded.reason
        ));
    }
    out
}
