//! Welcome email body

/// Render the welcome email as HTML
pub fn render_welcome(first_name: Option<&str>) -> String {
    let name = first_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(escape_html)
        .unwrap_or_else(|| "there".to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>Welcome! Your crypto wallet has been created</title></head>
  <body style="background:#FF719A;font-family:figtree,'Helvetica Neue',Helvetica,Arial,sans-serif;padding:40px 0;color:#cccccc">
    <div style="margin:0 auto;padding:24px 32px 48px;background-color:#1a1a1a;border-radius:12px;max-width:600px">
      <img src="https://emailwallets.com/waitlist-logo.png" width="220" height="100" alt="Email Wallets Logo">
      <p style="font-size:18px;line-height:28px">Hi {name},</p>
      <p style="font-size:16px;line-height:26px">&#127881; <strong>Welcome to the future!</strong> You just created a crypto wallet with nothing but your email address.</p>
      <p style="font-size:16px;line-height:26px">Here's what just happened:<br>
        &#9989; Created a secure, non-custodial crypto wallet<br>
        &#9989; No seed phrases to remember or lose<br>
        &#9989; Ready to receive crypto payments globally<br>
        &#9989; Works on any device, anywhere in the world</p>
      <p style="font-size:16px;line-height:26px">Welcome to invisible Web3! &#128640;</p>
      <hr style="border-color:#cccccc;margin:20px 0">
      <p style="color:#8c8c8c;font-size:12px">You received this email because you signed up and automatically created a crypto wallet.</p>
    </div>
  </body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greets_by_first_name() {
        assert!(render_welcome(Some("Tyler")).contains("Hi Tyler,"));
    }

    #[test]
    fn test_blank_name_falls_back() {
        assert!(render_welcome(None).contains("Hi there,"));
        assert!(render_welcome(Some("  ")).contains("Hi there,"));
    }

    #[test]
    fn test_name_is_escaped() {
        let html = render_welcome(Some("<script>alert('x')</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
