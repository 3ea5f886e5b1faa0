//! Embedded HTML/CSS/JS frontend for the carbonwise web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies; charts are
//! drawn as inline SVG.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>CarbonWise Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #00c853;
  --accent-2: #69f0ae;
  --green: #00c853;
  --yellow: #ffc107;
  --red: #ff5252;
  --blue: #58a6ff;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.health-badges { display: flex; gap: 8px; }
.badge {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 2px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok, .badge.ev { border-color: var(--green); color: var(--green); }
.badge.warn, .badge.hev, .badge.phev { border-color: var(--yellow); color: var(--yellow); }
.badge.err, .badge.ice { border-color: var(--red); color: var(--red); }

nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
}
nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card h3 { font-size: 14px; font-weight: 600; margin-bottom: 12px; color: var(--text-muted); }

.grid-2 { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.grid-3 { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }

.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}
.stat-card .value { font-size: 28px; font-weight: 700; font-family: var(--mono); color: var(--accent); }
.stat-card .label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }

.form-row { display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end; margin-bottom: 12px; }
.form-row label { display: flex; flex-direction: column; font-size: 12px; color: var(--text-muted); gap: 4px; }
input[type="text"], input[type="number"], select {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 6px 10px;
  font-size: 13px;
  font-family: var(--mono);
  min-width: 140px;
}
input:focus, select:focus { outline: none; border-color: var(--accent); }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; }
td.num, th.num { text-align: right; font-family: var(--mono); }
tr.selected { background: rgba(0,200,83,0.08); }
tr.disabled { opacity: 0.4; }

.btn {
  display: inline-flex;
  align-items: center;
  gap: 6px;
  padding: 6px 14px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
}
.btn:hover { border-color: var(--accent); color: var(--accent); }
.btn.primary { background: var(--accent); color: #fff; border-color: var(--accent); }
.btn:disabled { opacity: 0.4; cursor: not-allowed; }
.btn-group { display: flex; gap: 8px; }

.vehicle-card { position: relative; }
.vehicle-card .close { position: absolute; top: 10px; right: 12px; cursor: pointer; color: var(--text-muted); }
.vehicle-card .big { font-size: 26px; font-family: var(--mono); color: var(--accent); }
.pending { color: var(--text-muted); font-style: italic; }

.score { font-family: var(--mono); font-weight: 700; padding: 2px 8px; border-radius: 6px; }
.score-excellent { color: var(--green); }
.score-good { color: var(--yellow); }
.score-moderate { color: var(--red); }
.risk-badge { font-weight: 700; padding: 4px 12px; border-radius: 12px; border: 1px solid; }
.risk-low { color: var(--green); }
.risk-medium { color: var(--yellow); }
.risk-high { color: var(--red); }
ul.reasons { margin: 8px 0 0 18px; color: var(--text-muted); }

svg.chart { width: 100%; height: 240px; }
svg.chart text { fill: var(--text-muted); font-size: 11px; }

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 12px 20px;
  border-radius: var(--radius);
  background: var(--green);
  color: #fff;
  font-weight: 500;
  transform: translateY(80px);
  opacity: 0;
  transition: all 0.3s;
}
.toast.show { transform: translateY(0); opacity: 1; }
.toast.error { background: var(--red); }

.panel { display: none; }
.panel.active { display: block; }
.empty { text-align: center; padding: 32px 20px; color: var(--text-muted); }
.muted { color: var(--text-muted); }

@media (max-width: 768px) {
  .grid-2, .grid-3 { grid-template-columns: 1fr; }
  nav { flex-wrap: wrap; }
}
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1><span class="logo">CarbonWise</span> Dashboard</h1>
      <div class="subtitle">Vehicle lifecycle emissions explorer</div>
    </div>
    <div class="health-badges" id="health-badges"></div>
  </header>

  <nav id="nav">
    <button class="active" data-panel="compare">Compare</button>
    <button data-panel="breakeven">Break-Even</button>
    <button data-panel="recommend">Recommend</button>
    <button data-panel="greenwashing">Greenwashing</button>
    <button data-panel="grid">Grid Insights</button>
    <button data-panel="detail">Vehicle Detail</button>
  </nav>

  <!-- Compare -->
  <div class="panel active" id="panel-compare">
    <div class="card">
      <div class="form-row">
        <label>Country <input type="text" id="cmp-country" placeholder="US"></label>
        <label>Grid year <input type="number" id="cmp-year" placeholder="2024"></label>
        <label>Unit
          <select id="cmp-unit">
            <option value="g_km">g CO₂/km</option>
            <option value="lifetime_kg">kg (lifetime)</option>
            <option value="ten_year_kg">kg (10 years)</option>
          </select>
        </label>
        <label>Filter <input type="text" id="cmp-filter" placeholder="brand or model"></label>
        <button class="btn" id="cmp-apply">Apply</button>
      </div>
      <div class="muted" id="cmp-count">0 / 3 selected</div>
    </div>
    <div class="grid-3" id="cmp-cards"></div>
    <div class="grid-2">
      <div class="card"><h2>Lifecycle (g CO₂/km)</h2><svg class="chart" id="cmp-bar"></svg></div>
      <div class="card"><h2>Manufacturing vs Operational</h2><svg class="chart" id="cmp-stacked"></svg></div>
    </div>
    <div class="card">
      <h2>Vehicles</h2>
      <table>
        <thead><tr><th></th><th>Brand</th><th>Model</th><th class="num">Year</th><th>Type</th></tr></thead>
        <tbody id="cmp-list"></tbody>
      </table>
    </div>
  </div>

  <!-- Break-even -->
  <div class="panel" id="panel-breakeven">
    <div class="card">
      <div class="grid-2">
        <div>
          <h3>Electric vehicle</h3>
          <div class="form-row">
            <select id="be-ev-brand"></select><select id="be-ev-model"></select><select id="be-ev-year"></select>
          </div>
        </div>
        <div>
          <h3>Combustion vehicle</h3>
          <div class="form-row">
            <select id="be-ice-brand"></select><select id="be-ice-model"></select><select id="be-ice-year"></select>
          </div>
        </div>
      </div>
      <button class="btn primary" id="be-run">Calculate</button>
    </div>
    <div id="be-result" style="display:none">
      <div class="grid-2">
        <div class="stat-card"><div class="value" id="be-km">—</div><div class="label">Break-even km</div></div>
        <div class="card"><p id="be-message"></p></div>
      </div>
      <div class="card"><table><tbody id="be-table"></tbody></table></div>
      <div class="card" id="be-chart-card"><h2>Cumulative emissions (kg CO₂)</h2><svg class="chart" id="be-chart"></svg></div>
    </div>
  </div>

  <!-- Recommend -->
  <div class="panel" id="panel-recommend">
    <div class="card">
      <div class="form-row">
        <label>Daily km <input type="number" id="rec-daily" value="40"></label>
        <label>Years <input type="number" id="rec-years" value="8"></label>
        <label>Body type <input type="text" id="rec-body" placeholder="any"></label>
        <label>Powertrain
          <select id="rec-pt"><option value="">any</option><option>EV</option><option>HEV</option><option>PHEV</option><option>ICE</option></select>
        </label>
        <label>Price min <input type="number" id="rec-min"></label>
        <label>Price max <input type="number" id="rec-max"></label>
        <button class="btn primary" id="rec-run">Recommend</button>
      </div>
    </div>
    <div id="rec-results"></div>
  </div>

  <!-- Greenwashing -->
  <div class="panel" id="panel-greenwashing">
    <div class="card">
      <div class="form-row">
        <select id="gw-brand"></select><select id="gw-model"></select><select id="gw-year"></select>
        <label><span><input type="checkbox" id="gw-web"> search the web</span></label>
        <button class="btn primary" id="gw-run">Analyze</button>
      </div>
    </div>
    <div id="gw-result" style="display:none">
      <div class="grid-2">
        <div class="card"><h2 id="gw-vehicle"></h2><span class="risk-badge" id="gw-risk"></span><p class="mt" id="gw-lifecycle"></p></div>
        <div class="stat-card"><div class="value" id="gw-score">—</div><div class="label" id="gw-score-label"></div></div>
      </div>
      <div class="grid-2">
        <div class="card"><h2>Indicators</h2><div id="gw-indicators"></div></div>
        <div class="card"><h2>Findings</h2><div id="gw-findings"></div></div>
      </div>
    </div>
  </div>

  <!-- Grid insights -->
  <div class="panel" id="panel-grid">
    <div class="card">
      <div class="form-row">
        <label>Country <select id="grid-country"></select></label>
        <label><span><input type="checkbox" id="grid-forecast"> 5-year forecast</span></label>
      </div>
    </div>
    <div class="grid-3">
      <div class="stat-card"><div class="value" id="grid-gen">—</div><div class="label">Generation g/kWh</div></div>
      <div class="stat-card"><div class="value" id="grid-plug">—</div><div class="label">Plug-adjusted g/kWh</div></div>
      <div class="stat-card"><div class="value" id="grid-loss">—</div><div class="label">Transmission loss</div></div>
    </div>
    <div class="card"><h2>Intensity over time</h2><svg class="chart" id="grid-chart"></svg></div>
  </div>

  <!-- Vehicle detail -->
  <div class="panel" id="panel-detail">
    <div class="card">
      <div class="form-row">
        <select id="dt-brand"></select><select id="dt-model"></select><select id="dt-year"></select>
        <button class="btn primary" id="dt-run">Load</button>
      </div>
    </div>
    <div id="dt-result" style="display:none">
      <div class="grid-2">
        <div class="card">
          <h2 id="dt-title"></h2><div class="muted" id="dt-meta"></div>
          <table><tbody id="dt-table"></tbody></table>
        </div>
        <div class="stat-card"><div class="value" id="dt-score">—</div><div class="label" id="dt-score-label"></div></div>
      </div>
      <div class="grid-2">
        <div class="card"><h2>Breakdown (g/km)</h2><svg class="chart" id="dt-breakdown"></svg></div>
        <div class="card"><h2>Grid sensitivity (g/km)</h2><svg class="chart" id="dt-sensitivity"></svg></div>
      </div>
      <div class="card">
        <div class="form-row">
          <label>Annual km <input type="number" id="dt-km" value="15000"></label>
          <button class="btn" id="dt-impact">Annual impact</button>
          <span id="dt-impact-result" class="muted"></span>
        </div>
      </div>
    </div>
  </div>

  <div class="toast" id="toast"></div>
</div>

<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok || (data && data.error)) throw new Error(data.error || ('HTTP ' + res.status));
  return data;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function fmt(n) {
  if (n === undefined || n === null) return 'N/A';
  return n >= 1000 ? n.toLocaleString('en-US', { maximumFractionDigits: 1 }) : n.toFixed(1);
}

function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

function qs(params) {
  return Object.entries(params)
    .filter(([, v]) => v !== undefined && v !== null && v !== '')
    .map(([k, v]) => encodeURIComponent(k) + '=' + encodeURIComponent(v))
    .join('&');
}

// ---------------------------------------------------------------------------
// SVG charts
// ---------------------------------------------------------------------------
const COLORS = ['#00C853', '#69F0AE', '#58a6ff', '#ffc107', '#ff5252', '#bc8cff'];

function barChart(id, labels, series) {
  const svg = document.getElementById(id);
  const W = svg.clientWidth || 500, H = 240, pad = 30;
  const totals = labels.map((_, i) => series.reduce((s, ser) => s + (ser.values[i] || 0), 0));
  const max = Math.max(1, ...totals);
  const bw = labels.length ? (W - pad * 2) / labels.length : 0;
  let out = '';
  labels.forEach((label, i) => {
    let y = H - pad;
    series.forEach((ser, si) => {
      const h = (ser.values[i] || 0) / max * (H - pad * 2);
      y -= h;
      out += `<rect x="${pad + i * bw + bw * 0.15}" y="${y}" width="${bw * 0.7}" height="${h}" fill="${ser.color || COLORS[si]}"><title>${esc(ser.name)}: ${fmt(ser.values[i])}</title></rect>`;
    });
    out += `<text x="${pad + i * bw + bw / 2}" y="${H - 10}" text-anchor="middle">${esc(label)}</text>`;
    out += `<text x="${pad + i * bw + bw / 2}" y="${y - 4}" text-anchor="middle">${fmt(totals[i])}</text>`;
  });
  svg.innerHTML = out;
}

function lineChart(id, xs, series, dashedFrom) {
  const svg = document.getElementById(id);
  const W = svg.clientWidth || 500, H = 240, pad = 36;
  const all = series.flatMap(s => s.values.filter(v => v !== null));
  const max = Math.max(1, ...all);
  const xMin = Math.min(...xs), xMax = Math.max(...xs);
  const sx = x => pad + (xMax === xMin ? 0 : (x - xMin) / (xMax - xMin)) * (W - pad * 2);
  const sy = y => H - pad - y / max * (H - pad * 2);
  let out = '';
  series.forEach((s, si) => {
    const pts = xs.map((x, i) => s.values[i] === null ? null : `${sx(x)},${sy(s.values[i])}`).filter(p => p);
    out += `<polyline fill="none" stroke="${s.color || COLORS[si]}" stroke-width="2" points="${pts.join(' ')}"/>`;
    out += `<text x="${W - pad}" y="${14 + si * 14}" text-anchor="end" style="fill:${s.color || COLORS[si]}">${esc(s.name)}</text>`;
  });
  if (dashedFrom !== undefined && dashedFrom !== null) {
    out += `<line x1="${sx(dashedFrom)}" x2="${sx(dashedFrom)}" y1="${pad}" y2="${H - pad}" stroke="#8b949e" stroke-dasharray="4"/>`;
  }
  out += `<text x="${pad}" y="${H - 10}">${esc(fmt(xMin))}</text><text x="${W - pad}" y="${H - 10}" text-anchor="end">${esc(fmt(xMax))}</text>`;
  out += `<text x="4" y="${pad}">${esc(fmt(max))}</text>`;
  svg.innerHTML = out;
}

// ---------------------------------------------------------------------------
// Cascading dropdowns
// ---------------------------------------------------------------------------
function fill(select, placeholder, options) {
  select.innerHTML = `<option value="">${placeholder}</option>` +
    options.map(o => `<option value="${esc(o)}">${esc(o)}</option>`).join('');
}

function cascade(prefix, extra) {
  const b = document.getElementById(prefix + '-brand');
  const m = document.getElementById(prefix + '-model');
  const y = document.getElementById(prefix + '-year');
  const load = async () => {
    const opts = await api('GET', '/api/vehicles/cascade?' + qs({ ...extra, brand: b.value, model: m.value }));
    return opts;
  };
  const init = async () => {
    try {
      fill(b, 'Brand', (await load()).brands);
      fill(m, 'Model', []);
      fill(y, 'Year', []);
    } catch (e) { toast(e.message, true); }
  };
  b.addEventListener('change', async () => {
    m.value = '';
    fill(m, 'Model', b.value ? (await load()).models : []);
    fill(y, 'Year', []);
  });
  m.addEventListener('change', async () => {
    fill(y, 'Year', m.value ? (await load()).years : []);
  });
  init();
  return () => (b.value && m.value && y.value)
    ? { brand: b.value, model: m.value, year: parseInt(y.value, 10) }
    : null;
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------
let compareView = null;

async function loadCompare() {
  try {
    compareView = await api('GET', '/api/compare?' + qs({
      unit: document.getElementById('cmp-unit').value,
      country: document.getElementById('cmp-country').value.trim(),
      grid_year: document.getElementById('cmp-year').value,
    }));
    renderCompare();
  } catch (e) { toast('Failed to load vehicles: ' + e.message, true); }
}

function renderCompare() {
  const v = compareView;
  document.getElementById('cmp-count').textContent = `${v.selected_count} / 3 selected`;
  document.getElementById('cmp-cards').innerHTML = v.cards.map((c, i) => `
    <div class="card vehicle-card">
      <span class="close" data-index="${i}">✕</span>
      <h3>${esc(c.label)} (${c.key.year})</h3>
      ${c.powertrain ? `<span class="badge ${c.powertrain.toLowerCase()}">${esc(c.powertrain)}</span>` : ''}
      <div class="big">${c.pending ? '<span class="pending">loading…</span>' : fmt(c.value)}</div>
      <div class="muted">${esc(v.unit_label)}</div>
    </div>`).join('');
  const filter = document.getElementById('cmp-filter').value.toLowerCase();
  document.getElementById('cmp-list').innerHTML = v.list
    .filter(r => !filter || (r.key.brand + ' ' + r.key.model).toLowerCase().includes(filter))
    .slice(0, 300)
    .map(r => `
    <tr class="${r.selected ? 'selected' : ''} ${r.disabled ? 'disabled' : ''}">
      <td><input type="checkbox" ${r.selected ? 'checked' : ''} ${r.disabled ? 'disabled' : ''}
        data-brand="${esc(r.key.brand)}" data-model="${esc(r.key.model)}" data-year="${r.key.year}"></td>
      <td>${esc(r.key.brand)}</td><td>${esc(r.key.model)}</td><td class="num">${r.key.year}</td>
      <td><span class="badge ${r.powertrain.toLowerCase()}">${esc(r.powertrain)}</span></td>
    </tr>`).join('');
  barChart('cmp-bar', v.bar_labels, [{ name: 'Lifecycle', values: v.bar_values }]);
  barChart('cmp-stacked', v.stacked.labels, [
    { name: 'Manufacturing', values: v.stacked.manufacturing },
    { name: 'Operational', values: v.stacked.operational },
  ]);
}

document.getElementById('cmp-list').addEventListener('change', async e => {
  const d = e.target.dataset;
  if (!d.brand) return;
  try {
    const res = await api('POST', '/api/compare/toggle', { brand: d.brand, model: d.model, year: parseInt(d.year, 10) });
    compareView = res.view;
  } catch (err) {
    toast('Could not load lifecycle: ' + err.message, true);
    return loadCompare();
  }
  renderCompare();
});

document.getElementById('cmp-cards').addEventListener('click', async e => {
  const idx = e.target.dataset.index;
  if (idx === undefined) return;
  compareView = (await api('POST', '/api/compare/remove', { index: parseInt(idx, 10) })).view;
  renderCompare();
});

document.getElementById('cmp-apply').addEventListener('click', loadCompare);
document.getElementById('cmp-unit').addEventListener('change', loadCompare);
document.getElementById('cmp-filter').addEventListener('input', () => compareView && renderCompare());

// ---------------------------------------------------------------------------
// Break-even
// ---------------------------------------------------------------------------
let beEv = null, beIce = null;

document.getElementById('be-run').addEventListener('click', async () => {
  const ev = beEv(), ice = beIce();
  if (!ev || !ice) return toast('Select both vehicles', true);
  try {
    const r = await api('POST', '/api/break-even', { ev, ice });
    document.getElementById('be-result').style.display = 'block';
    document.getElementById('be-km').textContent = r.break_even;
    document.getElementById('be-message').textContent = r.message;
    document.getElementById('be-table').innerHTML =
      '<tr><th></th><th>Vehicle</th><th class="num">Mfg</th><th class="num">Op</th><th class="num">Total</th></tr>' +
      [['EV', r.ev], ['ICE', r.ice]].map(([t, s]) =>
        `<tr><td>${t}</td><td>${esc(s.label)}</td><td class="num">${s.manufacturing}</td><td class="num">${s.operational}</td><td class="num">${s.total}</td></tr>`).join('');
    const card = document.getElementById('be-chart-card');
    if (r.chart) {
      card.style.display = 'block';
      lineChart('be-chart', r.chart.distance_km, [
        { name: 'EV', values: r.chart.ev_kg, color: '#00C853' },
        { name: 'ICE', values: r.chart.ice_kg, color: '#FF5252' },
      ]);
    } else {
      card.style.display = 'none';
    }
  } catch (e) { toast('Break-even failed: ' + e.message, true); }
});

// ---------------------------------------------------------------------------
// Recommend
// ---------------------------------------------------------------------------
document.getElementById('rec-run').addEventListener('click', async () => {
  const num = id => { const v = document.getElementById(id).value; return v === '' ? undefined : Number(v); };
  const filters = {
    bodyType: document.getElementById('rec-body').value || undefined,
    powertrain: document.getElementById('rec-pt').value || undefined,
    priceMin: num('rec-min'),
    priceMax: num('rec-max'),
  };
  try {
    const cards = await api('POST', '/api/recommend', {
      daily_km: num('rec-daily'), years: num('rec-years'), filters,
    });
    const el = document.getElementById('rec-results');
    if (!cards.length) {
      el.innerHTML = '<div class="card empty">No vehicles match your criteria. Try adjusting your filters.</div>';
      return;
    }
    el.innerHTML = cards.map(c => `
      <div class="card">
        <h2>#${c.rank} ${esc(c.vehicle)} <span class="score score-${c.score_class}">${c.score}/100</span></h2>
        <span class="badge ${c.powertrain.toLowerCase()}">${esc(c.powertrain)}</span>
        <p><strong>Lifecycle:</strong> ${c.total_g_per_km.toFixed(1)} g/km</p>
        <ul class="reasons">${c.reasons.map(r => `<li>${esc(r)}</li>`).join('')}</ul>
      </div>`).join('');
  } catch (e) { toast('Recommendation failed: ' + e.message, true); }
});

// ---------------------------------------------------------------------------
// Greenwashing
// ---------------------------------------------------------------------------
let gwVehicle = null;

document.getElementById('gw-run').addEventListener('click', async () => {
  const v = gwVehicle();
  if (!v) return toast('Please select a vehicle', true);
  try {
    const r = await api('POST', '/api/greenwashing', { ...v, searchWeb: document.getElementById('gw-web').checked });
    document.getElementById('gw-result').style.display = 'block';
    document.getElementById('gw-vehicle').textContent = r.vehicle;
    const risk = document.getElementById('gw-risk');
    risk.textContent = r.risk_badge;
    risk.className = 'risk-badge risk-' + r.risk_level;
    document.getElementById('gw-lifecycle').textContent =
      `Total ${r.total} g/km · Manufacturing ${r.manufacturing} · Operational ${r.operational}`;
    document.getElementById('gw-score').textContent = Math.round(r.transparency_score);
    document.getElementById('gw-score-label').textContent = r.transparency_label;
    document.getElementById('gw-indicators').innerHTML = r.indicators.length
      ? r.indicators.map(i => `<p>⚠ ${esc(i)}</p>`).join('')
      : '<p class="score-excellent">✓ No greenwashing indicators detected</p>';
    document.getElementById('gw-findings').innerHTML = r.findings.length
      ? '<ul class="reasons">' + r.findings.map(f => `<li>${esc(f)}</li>`).join('') + '</ul>'
      : '<p class="muted">No significant findings.</p>';
  } catch (e) { toast('Analysis failed: ' + e.message, true); }
});

// ---------------------------------------------------------------------------
// Grid insights
// ---------------------------------------------------------------------------
async function loadCountries() {
  try {
    const countries = await api('GET', '/api/countries');
    const sel = document.getElementById('grid-country');
    sel.innerHTML = countries.map(c => `<option value="${esc(c.code)}">${esc(c.name)}</option>`).join('');
    loadGrid();
  } catch (e) { toast('Failed to load countries: ' + e.message, true); }
}

async function loadGrid() {
  try {
    const g = await api('GET', '/api/grid?' + qs({
      country: document.getElementById('grid-country').value,
      forecast: document.getElementById('grid-forecast').checked ? 1 : 0,
    }));
    document.getElementById('grid-gen').textContent = g.generation_intensity;
    document.getElementById('grid-plug').textContent = g.plug_adjusted_intensity;
    document.getElementById('grid-loss').textContent = g.transmission_loss;
    const firstProjected = g.series.find(p => p.projected);
    lineChart('grid-chart', g.series.map(p => p.year), [
      { name: 'Generation', values: g.series.map(p => p.raw) },
      { name: 'Plug-adjusted', values: g.series.map(p => p.corrected) },
    ], firstProjected ? firstProjected.year - 1 : null);
  } catch (e) { toast('Failed to load grid data: ' + e.message, true); }
}

document.getElementById('grid-country').addEventListener('change', loadGrid);
document.getElementById('grid-forecast').addEventListener('change', loadGrid);

// ---------------------------------------------------------------------------
// Vehicle detail
// ---------------------------------------------------------------------------
let dtVehicle = null, dtTotal = null;

document.getElementById('dt-run').addEventListener('click', async () => {
  const v = dtVehicle();
  if (!v) return toast('Please select a vehicle', true);
  try {
    const d = await api('GET', '/api/detail?' + qs(v));
    dtTotal = d.total_g_per_km;
    document.getElementById('dt-result').style.display = 'block';
    document.getElementById('dt-title').textContent = d.title;
    document.getElementById('dt-meta').textContent = d.meta;
    document.getElementById('dt-table').innerHTML =
      `<tr><td>Total lifecycle</td><td class="num">${d.total} g/km</td></tr>` +
      `<tr><td>Manufacturing</td><td class="num">${d.manufacturing} g/km</td></tr>` +
      `<tr><td>Operational</td><td class="num">${d.operational} g/km</td></tr>`;
    const score = document.getElementById('dt-score');
    score.textContent = Math.round(d.score);
    score.style.color = { green: '#00C853', amber: '#FFC107', red: '#FF5252' }[d.score_band];
    document.getElementById('dt-score-label').textContent = d.score_label;
    barChart('dt-breakdown', ['Manufacturing', 'Operational'], [{
      name: 'g/km', values: [d.breakdown.manufacturing_g_per_km, d.breakdown.operational_g_per_km],
    }]);
    barChart('dt-sensitivity', d.sensitivity.map(s => s.country), [{
      name: 'Total', values: d.sensitivity.map(s => s.total_g_per_km),
    }]);
    if (d.sensitivity_error) toast('Sensitivity unavailable: ' + d.sensitivity_error, true);
  } catch (e) { toast('Failed to load vehicle: ' + e.message, true); }
});

document.getElementById('dt-impact').addEventListener('click', async () => {
  if (dtTotal === null) return;
  try {
    const r = await api('POST', '/api/annual-impact', {
      total_g_per_km: dtTotal, annual_km: Number(document.getElementById('dt-km').value),
    });
    document.getElementById('dt-impact-result').textContent = `${r.annual_kg} kg CO₂ / year · ${r.equivalent}`;
  } catch (e) { toast('Annual impact failed: ' + e.message, true); }
});

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
const loaded = {};

document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (!panel) return;
  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');
  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');
  loadPanel(panel);
});

function loadPanel(panel) {
  if (loaded[panel]) return;
  loaded[panel] = true;
  switch (panel) {
    case 'compare': return loadCompare();
    case 'breakeven':
      beEv = cascade('be-ev', { powertrain: 'EV', consumption: 1 });
      beIce = cascade('be-ice', { powertrain: 'ICE' });
      return;
    case 'greenwashing': gwVehicle = cascade('gw', {}); return;
    case 'grid': return loadCountries();
    case 'detail': dtVehicle = cascade('dt', {}); return;
  }
}

// ---------------------------------------------------------------------------
// Health badges
// ---------------------------------------------------------------------------
async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    document.getElementById('health-badges').innerHTML = [
      badge('Backend', h.backend.ok ? 'ok' : 'err'),
      badge(h.defaults.country + ' · ' + h.defaults.grid_year, 'ok'),
    ].join('');
  } catch (e) {
    // Badges are informational only
  }
}

function badge(label, cls) {
  const dot = cls === 'ok' ? '●' : cls === 'warn' ? '○' : '✕';
  return `<span class="badge ${cls}">${dot} ${esc(label)}</span>`;
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadHealth();
loadPanel('compare');
</script>
</body>
</html>"##;
