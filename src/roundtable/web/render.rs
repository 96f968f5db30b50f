//! HTML for the discussion UI. All dynamic text goes through [`escape_html`].

use crate::roundtable::config::{Credentials, DEFAULT_TURNS, MAX_TURNS, MIN_TURNS, SUGGESTED_TOPICS};
use crate::roundtable::discussion::DiscussionOutcome;
use crate::roundtable::search::SearchBackend;

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.8rem}\
.entry{white-space:pre-wrap;margin:.6rem 0}\
.error{color:#a40000;border:1px solid #a40000;padding:.6rem}\
.success{color:#1a6b1a}\
code{background:#f2f2f2;padding:0 .2rem}";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body>\n<h1>{title}</h1>\n{body}\n</body></html>\n",
        title = escape_html(title),
        style = STYLE,
        body = body,
    )
}

const TITLE: &str = "3-Agent LLM Discussion with Contextual Memory and Dynamic Interaction";

fn key_field(name: &str, label: &str, has_default: bool) -> String {
    let placeholder = if has_default {
        "using environment default"
    } else {
        "required"
    };
    format!(
        "<label>{label} <input type=\"password\" name=\"{name}\" placeholder=\"{placeholder}\" autocomplete=\"off\"></label>\n",
        label = escape_html(label),
        name = name,
        placeholder = placeholder,
    )
}

/// The start page: topic entry, suggestions, keys, turn slider.
pub fn render_index(defaults: &Credentials, backend: SearchBackend) -> String {
    let mut body = String::new();

    body.push_str("<form method=\"post\" action=\"/discussion\">\n");
    body.push_str("<h2>Step 1: Enter Discussion Topic</h2>\n");
    body.push_str(
        "<label>Enter a topic for the agents to discuss: <input type=\"text\" name=\"topic\" size=\"50\"></label>\n",
    );
    let tries: Vec<String> = SUGGESTED_TOPICS
        .iter()
        .map(|t| format!("<code>{}</code>", escape_html(t)))
        .collect();
    body.push_str(&format!("<p><strong>TRY:</strong> {}</p>\n", tries.join(", ")));

    body.push_str("<label>Or select from popular topics: <select name=\"suggested_topic\">\n<option value=\"\"></option>\n");
    for topic in SUGGESTED_TOPICS {
        let topic = escape_html(topic);
        body.push_str(&format!("<option value=\"{0}\">{0}</option>\n", topic));
    }
    body.push_str("</select></label>\n");

    body.push_str("<h2>Step 2: Settings</h2>\n");
    body.push_str(&key_field("openai_api_key", "OpenAI API Key", defaults.openai_api_key.is_some()));
    body.push_str(&key_field("groq_api_key", "Groq API Key", defaults.groq_api_key.is_some()));
    body.push_str(&key_field("serpapi_key", "SerpAPI Key", defaults.serpapi_key.is_some()));

    body.push_str("<label>Search backend <select name=\"search_backend\">\n");
    for option in [SearchBackend::SerpApi, SearchBackend::DuckDuckGo] {
        let selected = if option == backend { " selected" } else { "" };
        body.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>\n",
            option.as_str(),
            selected
        ));
    }
    body.push_str("</select></label>\n");

    body.push_str(&format!(
        "<label>Number of Turns <input type=\"range\" name=\"turns\" min=\"{}\" max=\"{}\" value=\"{}\" \
         oninput=\"this.nextElementSibling.value=this.value\"><output>{}</output></label>\n",
        MIN_TURNS, MAX_TURNS, DEFAULT_TURNS, DEFAULT_TURNS
    ));

    body.push_str("<h2>Step 3: Start Discussion</h2>\n");
    body.push_str("<button type=\"submit\">Start Discussion</button>\n</form>\n");

    page(TITLE, &body)
}

/// One collapsible section per turn, the first one open.
pub fn render_outcome(outcome: &DiscussionOutcome) -> String {
    let mut body = String::new();
    body.push_str("<h2>Discussion</h2>\n");
    body.push_str(&format!(
        "<p><strong>Topic</strong>: {}</p>\n",
        escape_html(&outcome.topic)
    ));

    for turn in &outcome.turns {
        let open = if turn.number == 1 { " open" } else { "" };
        body.push_str(&format!(
            "<details class=\"turn\"{}>\n<summary>Turn {}</summary>\n",
            open, turn.number
        ));
        for entry in &turn.entries {
            body.push_str(&format!(
                "<div class=\"entry\"><strong>{}</strong>: {}</div>\n",
                escape_html(&entry.agent_name),
                escape_html(&entry.content)
            ));
        }
        body.push_str("</details>\n");
    }

    body.push_str("<p class=\"success\">Discussion concluded!</p>\n<p><a href=\"/\">New discussion</a></p>\n");
    page(TITLE, &body)
}

/// The inline error shown when a run cannot start.
pub fn render_error(message: &str) -> String {
    let body = format!(
        "<div class=\"error\">{}</div>\n<p><a href=\"/\">Back</a></p>\n",
        escape_html(message)
    );
    page(TITLE, &body)
}
