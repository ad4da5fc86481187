use crate::metrics::{derive_funnel, summarize, REGISTRANTS};
use crate::models::DashboardState;

pub fn render_index(state: &DashboardState) -> String {
    let summary = summarize(state);
    let funnel = derive_funnel(state);

    let registrants = state.program_metric(REGISTRANTS);
    let registrant_target = registrants
        .and_then(|metric| metric.target)
        .map(|target| format!("Target: {}", format_count(target)))
        .unwrap_or_default();

    let cards = [
        card(
            "Registrants",
            &format_count(registrants.map(|metric| metric.value).unwrap_or(0)),
            &registrant_target,
        ),
        card(
            "Visitors",
            &format_count(state.traffic.visitors),
            &format!("{:.1}% bounce rate", state.traffic.bounce_rate),
        ),
        card(
            "Total Badges Claimed",
            &format_count(state.badges.total_claimed),
            &format!("{:.1}% of weekly target", summary.badge_target_share),
        ),
        card(
            "Engagements",
            &format_count(state.social.direct_engagements),
            &format!("{:.1}% engagement rate", summary.engagement_rate),
        ),
    ]
    .concat();

    let kpi_rows: String = state
        .kpis
        .iter()
        .map(|kpi| {
            format!(
                r#"<tr><td>{name}</td><td><div class="bar"><div class="fill {slug}" style="width: {width}%"></div></div></td><td class="num">{current} / {target}</td><td><span class="status {slug}">{status}</span></td></tr>"#,
                name = escape_html(&kpi.name),
                slug = kpi.status.slug(),
                width = kpi.percentage.min(100),
                current = format_count(kpi.current),
                target = format_count(kpi.target),
                status = kpi.status.as_str(),
            )
        })
        .collect();

    let funnel_rows: String = funnel
        .iter()
        .map(|stage| {
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{:.1}%</td></tr>"#,
                escape_html(&stage.stage),
                format_count(stage.value),
                stage.percent_of_previous
            )
        })
        .collect();

    let age_rows: String = summary
        .age_shares
        .iter()
        .map(|share| {
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{:.1}%</td></tr>"#,
                escape_html(&share.label),
                format_count(share.value),
                share.percent
            )
        })
        .collect();

    let sms_rows: String = state
        .sms_campaigns
        .iter()
        .map(|campaign| {
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{:.1}%</td></tr>"#,
                escape_html(&campaign.name),
                format_count(campaign.delivered),
                format_count(campaign.clicked),
                campaign.rate
            )
        })
        .collect();

    let social = &state.social;
    let social_rows: String = [
        ("Reactions", social.reactions),
        ("Comments", social.comments),
        ("Shares", social.shares),
        ("Saves", social.saves),
        ("New Page Likes", social.page_likes),
        ("Clicks to Site", social.clicks_to_site),
        ("Impressions", social.impressions_delivered),
        ("Video Views", social.video_views),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            r#"<tr><td>{label}</td><td class="num">{}</td></tr>"#,
            format_count(*value)
        )
    })
    .collect();

    let podcast_rows: String = summary
        .podcasts
        .iter()
        .map(|series| {
            let top = series
                .top_episodes
                .first()
                .map(|episode| {
                    format!(
                        "{} (Week {}, {} plays)",
                        escape_html(&episode.title),
                        episode.week,
                        format_count(episode.plays)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td>{}</td></tr>"#,
                escape_html(&series.name),
                series.total_episodes,
                format_count(series.total_plays),
                format_count(series.average_plays),
                top
            )
        })
        .collect();

    INDEX_HTML
        .replace(
            "{{LAST_UPDATED}}",
            &state.last_updated.format("%B %-d, %Y %H:%M UTC").to_string(),
        )
        .replace("{{CARDS}}", &cards)
        .replace("{{KPI_ROWS}}", &kpi_rows)
        .replace("{{FUNNEL_ROWS}}", &funnel_rows)
        .replace("{{AGE_ROWS}}", &age_rows)
        .replace("{{SMS_ROWS}}", &sms_rows)
        .replace("{{SOCIAL_ROWS}}", &social_rows)
        .replace("{{PODCAST_ROWS}}", &podcast_rows)
        .replace("{{STORIES}}", &format_count(state.stories.submitted))
        .replace("{{STORIES_PCT}}", &format!("{:.0}", summary.stories_achievement))
}

fn card(label: &str, value: &str, note: &str) -> String {
    format!(
        r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span><span class="note">{note}</span></div>"#
    )
}

/// Thousands-separated integer, e.g. `10,595`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Self-Care School Dashboard</title>
  <style>
    :root {
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #4338ca;
      --card: #ffffff;
      --achieved: #10b981;
      --behind: #f59e0b;
      --at-risk: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: #f9fafb;
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      color: var(--accent);
    }

    .badge {
      display: inline-block;
      background: #e0e7ff;
      color: var(--accent);
      padding: 6px 12px;
      border-radius: 16px;
      font-size: 0.9rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat, section {
      background: var(--card);
      border-radius: 12px;
      padding: 18px;
      box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
    }

    .stat span {
      display: block;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.8rem;
      font-weight: 600;
    }

    .stat .note {
      color: var(--accent);
      font-weight: 500;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      padding: 8px;
      border-bottom: 1px solid #e5e7eb;
      text-align: left;
    }

    .num {
      text-align: right;
      font-variant-numeric: tabular-nums;
    }

    .bar {
      background: #f3f4f6;
      border-radius: 8px;
      height: 12px;
    }

    .fill {
      height: 12px;
      border-radius: 8px;
    }

    .fill.achieved, .status.achieved { background: var(--achieved); }
    .fill.behind, .status.behind { background: var(--behind); }
    .fill.at-risk, .status.at-risk { background: var(--at-risk); }

    .status {
      color: white;
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.85rem;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-top: 12px;
    }

    input, button {
      padding: 8px 12px;
      border-radius: 8px;
      border: 1px solid #d1d5db;
      font: inherit;
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      cursor: pointer;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Self-Care School Dashboard</h1>
      <span class="badge">Latest data as of {{LAST_UPDATED}}</span>
    </header>

    <div class="panel">{{CARDS}}</div>

    <section>
      <h2>KPI Progress</h2>
      <table>{{KPI_ROWS}}</table>
    </section>

    <section>
      <h2>Program Funnel</h2>
      <table>
        <tr><th>Stage</th><th class="num">Count</th><th class="num">Of previous</th></tr>
        {{FUNNEL_ROWS}}
      </table>
    </section>

    <section>
      <h2>Registrants by Age</h2>
      <table>{{AGE_ROWS}}</table>
    </section>

    <section>
      <h2>Social Media</h2>
      <table>{{SOCIAL_ROWS}}</table>
      <p>Stories submitted: {{STORIES}} ({{STORIES_PCT}}% achieved)</p>
    </section>

    <section>
      <h2>Podcasts</h2>
      <table>
        <tr><th>Series</th><th class="num">Episodes</th><th class="num">Plays</th><th class="num">Avg plays</th><th>Most played</th></tr>
        {{PODCAST_ROWS}}
      </table>
    </section>

    <section>
      <h2>SMS Campaigns</h2>
      <table>
        <tr><th>Campaign</th><th class="num">Delivered</th><th class="num">Clicked</th><th class="num">Rate</th></tr>
        {{SMS_ROWS}}
      </table>
      <form method="post" action="/sms/add">
        <input name="name" placeholder="Campaign name" required />
        <input name="delivered" type="number" min="0" value="0" />
        <input name="clicked" type="number" min="0" value="0" />
        <button type="submit">Add campaign</button>
      </form>
    </section>
  </main>
</body>
</html>
"#;
