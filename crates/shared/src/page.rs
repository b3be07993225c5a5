use crate::history::HistoryEntry;
use crate::models::{Briefing, Profile, Units};
use crate::prompt::RAIN_MENTION_THRESHOLD;

/// Forecast periods shown on the page
const FORECAST_COLUMNS: usize = 5;

/// Result of the last refresh, kept for display
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Ready(Briefing),
    Failed(String),
}

/// Everything the single page shows
pub struct PageView<'a> {
    pub profile_names: &'a [String],
    pub active: Option<(&'a str, &'a Profile)>,
    pub outcome: Option<&'a RunOutcome>,
    pub history: &'a [HistoryEntry],
    pub history_view: Option<&'a HistoryEntry>,
    pub notice: Option<&'a str>,
}

pub struct PageRenderer;

impl PageRenderer {
    pub fn render(view: &PageView<'_>) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str("  <title>Daily Briefing</title>\n");
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Arial, sans-serif; margin: 0; line-height: 1.6; display: flex; }\n");
        html.push_str("    aside { width: 280px; min-height: 100vh; padding: 20px; background-color: #ecf0f1; }\n");
        html.push_str("    main { flex: 1; max-width: 760px; margin: 0 auto; padding: 20px 40px; }\n");
        html.push_str("    h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }\n");
        html.push_str("    h2 { color: #34495e; }\n");
        html.push_str("    .caption { color: #7f8c8d; font-size: 0.9em; }\n");
        html.push_str("    .error { color: #c0392b; background-color: #fdecea; padding: 10px; border-left: 4px solid #c0392b; }\n");
        html.push_str("    .notice { color: #1e8449; background-color: #e9f7ef; padding: 10px; border-left: 4px solid #1e8449; }\n");
        html.push_str("    .metrics, .forecast { display: flex; gap: 20px; }\n");
        html.push_str("    .metric strong { display: block; font-size: 1.4em; }\n");
        html.push_str("    .link { color: #3498db; text-decoration: none; }\n");
        html.push_str("    .link:hover { text-decoration: underline; }\n");
        html.push_str("    form { margin: 10px 0; }\n");
        html.push_str("    input, select, textarea { width: 100%; box-sizing: border-box; margin-bottom: 6px; }\n");
        html.push_str("    button { cursor: pointer; padding: 6px 12px; }\n");
        html.push_str("    button.primary { background-color: #3498db; color: white; border: none; width: 100%; padding: 10px; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        Self::render_sidebar(&mut html, view);

        html.push_str("<main>\n");
        html.push_str("  <h1>☀️ Your Daily Briefing</h1>\n");
        match view.active {
            Some((name, profile)) => html.push_str(&format!(
                "  <p class=\"caption\">Profile: <strong>{}</strong> · {}</p>\n",
                Self::escape_html(name),
                Self::escape_html(&profile.city)
            )),
            None => html.push_str(
                "  <p class=\"caption\">Create a profile in the sidebar to get started.</p>\n",
            ),
        }

        if let Some(notice) = view.notice {
            html.push_str(&format!(
                "  <p class=\"notice\">{}</p>\n",
                Self::escape_html(notice)
            ));
        }

        if let Some(entry) = view.history_view {
            // History mode shows only the stored briefing
            html.push_str(&format!(
                "  <p class=\"notice\">📅 Viewing briefing from <strong>{}</strong> · Generated at {}</p>\n",
                entry.date,
                Self::escape_html(&entry.generated_at)
            ));
            html.push_str(&Self::paragraphs(&entry.briefing));
            html.push_str("  <p><a class=\"link\" href=\"/\">✕ Close</a></p>\n");
            html.push_str("</main>\n</body>\n</html>");
            return html;
        }

        let disabled = if view.active.is_some() { "" } else { " disabled" };
        html.push_str(&format!(
            "  <form method=\"post\" action=\"/refresh\"><button class=\"primary\"{}>🔄 Generate My Briefing</button></form>\n",
            disabled
        ));

        match view.outcome {
            Some(RunOutcome::Ready(briefing)) => {
                html.push_str(&format!(
                    "  <p class=\"caption\">Last generated at {}</p>\n",
                    briefing.generated_label()
                ));
                html.push_str("  <h2>📋 Your Briefing</h2>\n");
                html.push_str(&Self::paragraphs(&briefing.text));
                let units = view.active.map(|(_, p)| p.units).unwrap_or_default();
                Self::render_details(&mut html, briefing, units);
            }
            Some(RunOutcome::Failed(message)) => {
                html.push_str(&format!(
                    "  <p class=\"error\">{}</p>\n",
                    Self::escape_html(message)
                ));
            }
            None => {}
        }

        html.push_str("</main>\n</body>\n</html>");
        html
    }

    fn render_sidebar(html: &mut String, view: &PageView<'_>) {
        html.push_str("<aside>\n");
        html.push_str("  <h2>👤 Profiles</h2>\n");

        match view.active {
            Some((active_name, profile)) => {
                html.push_str("  <form method=\"post\" action=\"/select\">\n");
                html.push_str("    <select name=\"name\" onchange=\"this.form.submit()\">\n");
                for name in view.profile_names {
                    let selected = if name == active_name { " selected" } else { "" };
                    html.push_str(&format!(
                        "      <option value=\"{0}\"{1}>{0}</option>\n",
                        Self::escape_html(name),
                        selected
                    ));
                }
                html.push_str("    </select>\n");
                html.push_str("    <noscript><button>Switch</button></noscript>\n");
                html.push_str("  </form>\n");
                html.push_str(&format!(
                    "  <p class=\"caption\">📍 {} · {}</p>\n",
                    Self::escape_html(&profile.city),
                    profile.units.as_str()
                ));

                html.push_str("  <details>\n    <summary>✏️ Edit Profile</summary>\n");
                html.push_str("    <form method=\"post\" action=\"/profiles/update\">\n");
                html.push_str(&format!(
                    "      <input type=\"hidden\" name=\"name\" value=\"{}\">\n",
                    Self::escape_html(active_name)
                ));
                Self::profile_fields(html, profile);
                html.push_str("      <button>💾 Save Changes</button>\n    </form>\n  </details>\n");

                if view.profile_names.len() > 1 {
                    html.push_str(&format!(
                        "  <form method=\"post\" action=\"/profiles/delete\"><input type=\"hidden\" name=\"name\" value=\"{}\"><button>🗑️ Delete Profile</button></form>\n",
                        Self::escape_html(active_name)
                    ));
                }

                if !view.history.is_empty() {
                    html.push_str("  <hr>\n");
                    html.push_str(&format!(
                        "  <details>\n    <summary>📅 Past Briefings ({})</summary>\n    <ul>\n",
                        view.history.len()
                    ));
                    for entry in view.history {
                        html.push_str(&format!(
                            "      <li><a class=\"link\" href=\"/history/{0}\">{0}</a></li>\n",
                            entry.date
                        ));
                    }
                    html.push_str("    </ul>\n  </details>\n");
                }
            }
            None => {
                html.push_str("  <p class=\"caption\">No profiles yet. Create one below.</p>\n");
            }
        }

        html.push_str("  <hr>\n");
        html.push_str("  <details>\n    <summary>➕ New Profile</summary>\n");
        html.push_str("    <form method=\"post\" action=\"/profiles\">\n");
        html.push_str(
            "      <input name=\"name\" placeholder=\"Profile Name, e.g. Jane\" required>\n",
        );
        Self::profile_fields(html, &Profile::default());
        html.push_str("      <button>✅ Create Profile</button>\n    </form>\n  </details>\n");
        html.push_str("</aside>\n");
    }

    fn profile_fields(html: &mut String, profile: &Profile) {
        html.push_str(&format!(
            "      <label>City</label><input name=\"city\" value=\"{}\">\n",
            Self::escape_html(&profile.city)
        ));
        html.push_str("      <label>Units</label><select name=\"units\">\n");
        for units in [Units::Imperial, Units::Metric] {
            let selected = if units == profile.units { " selected" } else { "" };
            html.push_str(&format!(
                "        <option value=\"{0}\"{1}>{0}</option>\n",
                units.as_str(),
                selected
            ));
        }
        html.push_str("      </select>\n");
        html.push_str(&format!(
            "      <label>Topics (one per line)</label><textarea name=\"topics\" rows=\"6\">{}</textarea>\n",
            Self::escape_html(&profile.topics.join("\n"))
        ));
        html.push_str(&format!(
            "      <label>Briefing Tone</label><input name=\"briefing_tone\" value=\"{}\">\n",
            Self::escape_html(&profile.briefing_tone)
        ));
        html.push_str(&format!(
            "      <label>Max articles per topic</label><input name=\"max_articles_per_topic\" type=\"number\" min=\"1\" max=\"{}\" value=\"{}\" required>\n",
            Profile::MAX_ARTICLES_LIMIT,
            profile.max_articles_per_topic
        ));
    }

    fn render_details(html: &mut String, briefing: &Briefing, units: Units) {
        let weather = &briefing.weather;

        html.push_str("  <hr>\n  <h2>🌤️ Weather Details</h2>\n");
        html.push_str("  <div class=\"metrics\">\n");
        for (label, value) in [
            ("Temperature", format!("{}°", weather.temperature)),
            ("Feels Like", format!("{}°", weather.feels_like)),
            ("Humidity", format!("{}%", weather.humidity)),
            ("Wind", format!("{} {}", weather.wind_speed, units.speed_unit())),
        ] {
            html.push_str(&format!(
                "    <div class=\"metric\">{}<strong>{}</strong></div>\n",
                label, value
            ));
        }
        html.push_str("  </div>\n");

        if !briefing.forecast.is_empty() {
            html.push_str("  <p class=\"caption\">Today's Forecast</p>\n");
            html.push_str("  <div class=\"forecast\">\n");
            for entry in briefing.forecast.iter().take(FORECAST_COLUMNS) {
                html.push_str("    <div>\n");
                html.push_str(&format!(
                    "      <strong>{}</strong><br>{} {}°\n",
                    Self::escape_html(&entry.time),
                    entry.emoji,
                    entry.temp
                ));
                if entry.pop > RAIN_MENTION_THRESHOLD {
                    html.push_str(&format!(
                        "      <br><span class=\"caption\">💧 {}%</span>\n",
                        entry.pop
                    ));
                }
                html.push_str("    </div>\n");
            }
            html.push_str("  </div>\n");
        }

        html.push_str("  <hr>\n  <h2>📰 Headlines</h2>\n");
        for group in &briefing.news.topics {
            html.push_str(&format!(
                "  <details>\n    <summary>{} ({} articles)</summary>\n",
                Self::escape_html(&Self::title_case(&group.topic)),
                group.headlines.len()
            ));
            if group.headlines.is_empty() {
                html.push_str("    <p>No articles found for this topic.</p>\n");
            }
            for headline in &group.headlines {
                html.push_str(&format!(
                    "    <p><a href=\"{}\" class=\"link\" target=\"_blank\"><strong>{}</strong></a><br><span class=\"caption\">Source: {}</span></p>\n",
                    Self::escape_html(&headline.url),
                    Self::escape_html(&headline.title),
                    Self::escape_html(&headline.source)
                ));
            }
            html.push_str("  </details>\n");
        }
    }

    /// Blank-line separated blocks become paragraphs; single newlines become breaks
    fn paragraphs(text: &str) -> String {
        text.split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                format!(
                    "  <p>{}</p>\n",
                    Self::escape_html(block).replace('\n', "<br>\n")
                )
            })
            .collect()
    }

    fn title_case(text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}
