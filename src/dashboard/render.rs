//! Server-side HTML for the dashboard page.

use crate::dashboard::stats::DashboardSnapshot;
use crate::fleet::{Vehicle, VehicleStatus};

/// Render the full dashboard page.
pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let rows = if snapshot.vehicles.is_empty() {
        r#"<tr><td colspan="5" class="empty">No vehicles registered yet. Use /add in the bot.</td></tr>"#
            .to_string()
    } else {
        snapshot
            .vehicles
            .iter()
            .map(render_row)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Fleet Dashboard</title>
<script src="https://telegram.org/js/telegram-web-app.js"></script>
<style>
body {{ font-family: -apple-system, system-ui, sans-serif; margin: 0; padding: 16px;
       background: var(--tg-theme-bg-color, #f4f5f7); color: var(--tg-theme-text-color, #1d1d1f); }}
h1 {{ font-size: 1.4rem; margin: 0 0 16px; }}
.stats {{ display: flex; gap: 12px; margin-bottom: 16px; }}
.stat {{ flex: 1; background: var(--tg-theme-secondary-bg-color, #fff); border-radius: 12px; padding: 12px; }}
.stat .value {{ font-size: 1.8rem; font-weight: 600; }}
.stat .label {{ font-size: 0.85rem; opacity: 0.7; }}
table {{ width: 100%; border-collapse: collapse; background: var(--tg-theme-secondary-bg-color, #fff);
        border-radius: 12px; overflow: hidden; }}
th, td {{ padding: 10px 8px; text-align: left; border-bottom: 1px solid rgba(0,0,0,0.06); }}
th {{ font-size: 0.8rem; text-transform: uppercase; opacity: 0.6; }}
.plate {{ font-family: ui-monospace, monospace; font-weight: 600; }}
.badge {{ padding: 2px 8px; border-radius: 999px; font-size: 0.8rem; }}
.badge.idle {{ background: #e5e7eb; color: #374151; }}
.badge.on-route {{ background: #d1fae5; color: #065f46; }}
.badge.maintenance {{ background: #fee2e2; color: #991b1b; }}
.empty {{ text-align: center; opacity: 0.6; }}
</style>
</head>
<body>
<h1>🚛 Fleet Dashboard</h1>
<div class="stats">
  <div class="stat"><div class="value" id="stat-total">{total}</div><div class="label">Total vehicles</div></div>
  <div class="stat"><div class="value" id="stat-active">{active}</div><div class="label">On route</div></div>
</div>
<table>
<thead><tr><th>#</th><th>Plate</th><th>Driver</th><th>Status</th><th>Mileage, km</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
<script>if (window.Telegram && Telegram.WebApp) {{ Telegram.WebApp.ready(); Telegram.WebApp.expand(); }}</script>
</body>
</html>"#,
        total = snapshot.stats.total,
        active = snapshot.stats.active,
    )
}

fn render_row(vehicle: &Vehicle) -> String {
    format!(
        r#"<tr><td>{id}</td><td class="plate">{plate}</td><td>{driver}</td><td><span class="badge {class}">{status}</span></td><td>{mileage:.1}</td></tr>"#,
        id = vehicle.id,
        plate = html_escape(&vehicle.plate_number),
        driver = html_escape(&vehicle.driver_name),
        class = status_class(vehicle.status),
        status = vehicle.status,
        mileage = vehicle.mileage,
    )
}

fn status_class(status: VehicleStatus) -> &'static str {
    match status {
        VehicleStatus::Idle => "idle",
        VehicleStatus::OnRoute => "on-route",
        VehicleStatus::Maintenance => "maintenance",
    }
}

/// Page shown when the store can't be read.
pub fn render_unavailable() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Fleet Dashboard</title></head>
<body><h1>Dashboard unavailable</h1><p>The vehicle store could not be read. Try again shortly.</p></body>
</html>"#
        .to_string()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
