use super::assemble::{assemble, EmbeddedPayload};
use super::error::{ReportError, Result};
use super::types::{value_text, ItemStatus, ReportPayload};
use crate::utils::config::CdnUrls;
use crate::view::format::{format_duration, status_code_is_error};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Values stamped into the document at generation time.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub cdn: CdnUrls,
    pub generated_at: String,
    pub exported_by: Option<String>,
}

/// Generate HTML report
pub async fn generate(
    payload: &ReportPayload,
    options: &RenderOptions,
    output: Option<&Path>,
) -> Result<()> {
    let html = generate_report_html(payload, options)?;

    if let Some(path) = output {
        std::fs::write(path, html).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        println!(
            "{} HTML report saved to: {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    } else {
        println!("{}", html);
    }

    Ok(())
}

/// Assemble the payload and expand the document template around it.
pub fn generate_report_html(payload: &ReportPayload, options: &RenderOptions) -> Result<String> {
    let embedded = assemble(payload)?;
    Ok(render_document(&embedded, payload, options))
}

/// Expand the document template. Pure string work: the payload is neither
/// validated nor executed, and every missing field has a placeholder.
pub fn render_document(
    embedded: &EmbeddedPayload,
    payload: &ReportPayload,
    options: &RenderOptions,
) -> String {
    let title = match payload.plan_name() {
        Some(name) => format!("Test Report - {}", html_escape(name)),
        None => "Test Report".to_string(),
    };

    let meta = json!({
        "generatedAt": options.generated_at,
        "exportedBy": options.exported_by,
    })
    .to_string()
    .replace('<', "\\u003c");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="{vue}"></script>
  <script src="{tailwind}"></script>
  <script src="{echarts}"></script>
  <style>{style}</style>
</head>
<body>
{fallback}
{app}
  <script>
    window.REPORT_DATA = {data};
    window.REPORT_META = {meta};
  </script>
  <script>{runtime}</script>
</body>
</html>
"#,
        title = title,
        vue = html_escape(&options.cdn.vue),
        tailwind = html_escape(&options.cdn.tailwind),
        echarts = html_escape(&options.cdn.echarts),
        style = STYLE,
        fallback = render_fallback(payload, options),
        app = APP_MARKUP,
        data = embedded,
        meta = meta,
        runtime = RUNTIME_SCRIPT,
    )
}

/// Library-free summary and case table, readable even when none of the CDN
/// scripts load. The runtime removes it once the interactive view mounts.
fn render_fallback(payload: &ReportPayload, options: &RenderOptions) -> String {
    let summary = payload.plan_summary.clone().unwrap_or_default();
    let plan_name = html_escape(payload.plan_name().unwrap_or("Test Report"));
    let plan_id = html_escape(&summary.plan_id_text().unwrap_or_else(|| "-".to_string()));

    let mut rows = String::new();
    for item in &payload.plan_items {
        let status_class = match item.status {
            ItemStatus::Success => "status-success",
            ItemStatus::Failed => "status-failed",
            ItemStatus::Other(_) => "status-other",
        };
        let code = match item.status_code {
            Some(code) if status_code_is_error(code) => {
                format!(r#"<span class="text-error">{}</span>"#, code)
            }
            Some(code) => code.to_string(),
            None => "-".to_string(),
        };
        rows.push_str(&format!(
            r#"
        <tr>
          <td><span class="status-badge {status_class}">{status}</span></td>
          <td>{name}</td>
          <td class="mono">{method}</td>
          <td>{code}</td>
          <td>{duration}</td>
        </tr>"#,
            status_class = status_class,
            status = html_escape(item.status.as_str()),
            name = html_escape(&item.display_name()),
            method = html_escape(item.method.as_deref().unwrap_or("-")),
            code = code,
            duration = format_duration(item.duration_ms),
        ));
    }

    let table = if payload.plan_items.is_empty() {
        r#"<p class="empty">No test cases in this report</p>"#.to_string()
    } else {
        format!(
            r#"<table>
        <thead><tr><th>Status</th><th>Case</th><th>Method</th><th>HTTP</th><th>Duration</th></tr></thead>
        <tbody>{}
        </tbody>
      </table>"#,
            rows
        )
    };

    format!(
        r#"  <div id="static-report">
    <h1>{plan_name}</h1>
    <p class="meta">Plan ID: {plan_id} &middot; Total: {total} &middot; Passed: {success} &middot; Failed: {failed} &middot; Duration: {duration} &middot; Generated: {generated}</p>
    <div class="card">
      {table}
    </div>
  </div>"#,
        plan_name = plan_name,
        plan_id = plan_id,
        total = value_or_dash(summary.total),
        success = value_or_dash(summary.success),
        failed = value_or_dash(summary.failed),
        duration = format_duration(summary.duration_ms),
        generated = html_escape(&options.generated_at),
        table = table,
    )
}

fn value_or_dash(value: Option<u64>) -> String {
    value_text(value.map(serde_json::Value::from).as_ref())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const STYLE: &str = r#"
    body { margin: 0; background-color: #f9fafb; color: #111827; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif; }
    [v-cloak] { display: none; }
    #static-report { max-width: 1100px; margin: 0 auto; padding: 24px; }
    #static-report h1 { font-size: 20px; margin: 0 0 8px; }
    #static-report .meta { color: #6b7280; font-size: 13px; margin: 0 0 16px; }
    #static-report table { width: 100%; border-collapse: collapse; font-size: 13px; }
    #static-report th, #static-report td { text-align: left; padding: 8px 12px; border-bottom: 1px solid #f3f4f6; }
    #static-report th { color: #6b7280; font-weight: 500; text-transform: uppercase; font-size: 11px; }
    #static-report .empty { padding: 32px; text-align: center; color: #6b7280; }
    .mono { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; }
    .text-error { color: #dc2626; }
    .status-badge { padding: 2px 8px; border-radius: 4px; font-size: 12px; font-weight: 600; }
    .status-success { background-color: #d1fae5; color: #065f46; border: 1px solid #a7f3d0; }
    .status-failed { background-color: #fee2e2; color: #991b1b; border: 1px solid #fecaca; }
    .status-other { background-color: #f3f4f6; color: #374151; border: 1px solid #e5e7eb; }
    .card { background: white; border-radius: 8px; box-shadow: 0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px 0 rgba(0, 0, 0, 0.06); }
    .list-item { transition: background-color 0.2s; cursor: pointer; }
    .list-item:hover { background-color: #f3f4f6; }
    .list-item.active { background-color: #eff6ff; border-left: 4px solid #3b82f6; }
    .log-error { color: #dc2626; }
    .log-success { color: #16a34a; }
    .log-neutral { color: #4b5563; }

    ::-webkit-scrollbar { width: 8px; height: 8px; }
    ::-webkit-scrollbar-track { background: #f1f1f1; }
    ::-webkit-scrollbar-thumb { background: #d1d5db; border-radius: 4px; }
    ::-webkit-scrollbar-thumb:hover { background: #9ca3af; }

    pre { white-space: pre-wrap; word-wrap: break-word; }
"#;

const APP_MARKUP: &str = r#"  <div id="app" v-cloak class="min-h-screen flex flex-col">
    <header class="bg-white border-b border-gray-200 px-6 py-4 flex items-center justify-between sticky top-0 z-10 shadow-sm">
      <div class="flex items-center gap-4">
        <h1 class="text-xl font-bold text-gray-900">{{ planSummary.planName || 'Test Report' }}</h1>
        <span class="px-2 py-1 bg-gray-100 rounded text-xs text-gray-600">Plan ID: {{ valueText(planSummary.planId) }}</span>
        <span v-if="planSummary.environment" class="px-2 py-1 bg-blue-50 text-blue-700 rounded text-xs border border-blue-100">
          {{ formatEnvironment(planSummary.environment) }}
        </span>
        <span class="px-2 py-1 bg-gray-100 rounded text-xs text-gray-600">Run #{{ valueText(reportDetail.planRunNo) }}</span>
      </div>
      <div class="text-sm text-gray-500 text-right">
        <div>Generated: {{ meta.generatedAt || '-' }}</div>
        <div v-if="meta.exportedBy">Exported by {{ meta.exportedBy }}</div>
      </div>
    </header>

    <main class="flex-1 p-6 flex gap-6 overflow-hidden h-[calc(100vh-64px)]">
      <div class="w-1/2 flex flex-col gap-6 h-full overflow-hidden">
        <div class="card p-6 flex-shrink-0">
          <div class="flex gap-8">
            <div class="relative w-32 h-32">
              <div ref="chartRef" class="w-full h-full"></div>
              <div class="absolute inset-0 flex flex-col items-center justify-center pointer-events-none">
                <div class="text-xs text-gray-500">Pass rate</div>
                <div class="text-lg font-bold text-gray-900">{{ successRate }}%</div>
              </div>
            </div>
            <div class="grid grid-cols-2 gap-x-8 gap-y-2 text-sm">
              <div class="text-gray-500">Total duration</div>
              <div class="font-medium">{{ formatDuration(planSummary.durationMs) }}</div>

              <div class="text-gray-500">Cases</div>
              <div class="font-medium">Run: {{ valueText(planSummary.total) }} &nbsp; Failed: <span class="text-red-600">{{ valueText(planSummary.failed) }}</span></div>

              <div class="text-gray-500">Request time</div>
              <div class="font-medium">{{ formatDuration(avgDuration) }} (avg)</div>

              <div class="text-gray-500">Executed by</div>
              <div class="font-medium">{{ planSummary.executedBy || '-' }}</div>
            </div>
          </div>
        </div>

        <div class="flex items-center gap-4 flex-shrink-0">
          <div class="flex bg-white rounded-lg border border-gray-200 p-1">
            <button
              v-for="filter in filters"
              :key="filter"
              @click="currentFilter = filter"
              class="px-3 py-1 text-sm rounded-md transition-colors"
              :class="currentFilter === filter ? 'bg-gray-100 font-medium text-gray-900' : 'text-gray-600 hover:bg-gray-50'"
            >
              {{ filterLabels[filter] }}
              <span class="text-xs ml-1 opacity-70">({{ getFilterCount(filter) }})</span>
            </button>
          </div>
          <div class="relative flex-1">
            <input
              v-model="searchQuery"
              type="text"
              placeholder="Search case name or URL..."
              class="w-full pl-8 pr-4 py-1.5 text-sm border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500 focus:border-transparent"
            >
            <svg class="w-4 h-4 text-gray-400 absolute left-2.5 top-2" fill="none" stroke="currentColor" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0z"></path></svg>
          </div>
        </div>

        <div class="card flex-1 overflow-y-auto">
          <div v-if="filteredItems.length === 0" class="p-8 text-center text-gray-500">
            {{ planItems.length === 0 ? 'No test cases in this report' : 'No matching test cases' }}
          </div>
          <div v-else class="divide-y divide-gray-100">
            <div
              v-for="entry in filteredItems"
              :key="entry.index"
              @click="selectItem(entry.index)"
              class="list-item p-4 flex items-center justify-between"
              :class="{ 'active': selectedIndex === entry.index }"
            >
              <div class="flex items-center gap-3 overflow-hidden">
                <span class="flex-shrink-0 status-badge" :class="statusClass(entry.item.status)">
                  {{ statusLabel(entry.item.status) }}
                </span>
                <div class="flex flex-col overflow-hidden">
                  <span class="text-sm font-medium text-gray-900 truncate" :title="entry.item.caseName || entry.item.url">
                    {{ displayName(entry.item) }}
                  </span>
                  <span v-if="entry.item.method || (entry.item.caseName && entry.item.url)" class="text-xs text-gray-500 mono mt-0.5 truncate" :title="entry.item.url">
                    <span v-if="entry.item.method">{{ entry.item.method }}</span>
                    <span v-if="entry.item.method && entry.item.caseName && entry.item.url" class="text-gray-400 mx-1">|</span>
                    <span v-if="entry.item.caseName && entry.item.url">{{ entry.item.url }}</span>
                  </span>
                </div>
              </div>
              <div class="text-xs text-gray-500 flex-shrink-0">{{ formatDuration(entry.item.durationMs) }}</div>
            </div>
          </div>
        </div>
      </div>

      <div class="w-1/2 h-full card flex flex-col overflow-hidden border border-gray-200">
        <div v-if="!selectedItem" class="h-full flex flex-col items-center justify-center text-gray-400">
          <p>Select a test case on the left to see its details</p>
        </div>

        <div v-else class="flex flex-col h-full">
          <div class="p-4 border-b border-gray-100 bg-gray-50">
            <div class="flex items-start justify-between">
              <div class="space-y-1 w-full overflow-hidden">
                <h3 class="font-semibold text-gray-900 break-all pr-4">{{ displayName(selectedItem) }}</h3>
                <div class="flex flex-col gap-1 text-xs text-gray-500">
                  <div v-if="selectedItem.caseName && selectedItem.url" class="mono break-all">{{ selectedItem.url }}</div>
                  <div class="flex items-center gap-2">
                    <span v-if="selectedItem.method" class="mono bg-gray-200 px-1.5 rounded">{{ selectedItem.method }}</span>
                    <span>From {{ selectedItem.source || ('report #' + valueText(selectedItem.reportId)) }}</span>
                  </div>
                </div>
              </div>
              <button @click="clearSelection()" class="text-gray-400 hover:text-gray-600 flex-shrink-0">&times;</button>
            </div>

            <div class="mt-4 flex gap-4 text-xs bg-white p-2 rounded border border-gray-100">
              <div>
                <span class="text-gray-500">HTTP status:</span>
                <span class="font-medium ml-1" :class="selectedItem.statusCode >= 400 ? 'text-red-600' : 'text-green-600'">
                  {{ selectedItem.statusCode || '-' }}
                </span>
              </div>
              <div>
                <span class="text-gray-500">Duration:</span>
                <span class="font-medium ml-1">{{ formatDuration(selectedItem.durationMs) }}</span>
              </div>
              <div>
                <span class="text-gray-500">Size:</span>
                <span class="font-medium ml-1">{{ formatSize(selectedItem.responseSize) }}</span>
              </div>
            </div>
          </div>

          <div class="flex border-b border-gray-200 bg-white">
            <button
              v-for="tab in tabs"
              :key="tab.id"
              @click="currentTab = tab.id"
              class="px-4 py-2 text-sm font-medium border-b-2 transition-colors"
              :class="currentTab === tab.id ? 'border-blue-500 text-blue-600' : 'border-transparent text-gray-500 hover:text-gray-700 hover:border-gray-300'"
            >
              {{ tab.label }}
            </button>
          </div>

          <div class="flex-1 overflow-y-auto p-4 bg-white mono text-sm">
            <div v-if="currentTab === 'steps'">
              <div v-if="selectedItem.steps && selectedItem.steps.length" class="overflow-hidden border border-gray-200 rounded">
                <table class="min-w-full divide-y divide-gray-200">
                  <thead class="bg-gray-50">
                    <tr>
                      <th class="px-3 py-2 text-left text-xs font-medium text-gray-500 uppercase w-16">Step</th>
                      <th class="px-3 py-2 text-left text-xs font-medium text-gray-500 uppercase w-24">Action</th>
                      <th class="px-3 py-2 text-left text-xs font-medium text-gray-500 uppercase w-20">Status</th>
                      <th class="px-3 py-2 text-left text-xs font-medium text-gray-500 uppercase">Details</th>
                      <th class="px-3 py-2 text-left text-xs font-medium text-gray-500 uppercase w-24">Duration</th>
                    </tr>
                  </thead>
                  <tbody class="bg-white divide-y divide-gray-200">
                    <tr v-for="(step, idx) in selectedItem.steps" :key="idx" class="hover:bg-gray-50">
                      <td class="px-3 py-2 text-xs text-gray-500 text-center">{{ step.id || idx + 1 }}</td>
                      <td class="px-3 py-2 text-xs font-medium text-gray-900">{{ step.action || '-' }}</td>
                      <td class="px-3 py-2 text-xs">
                        <span class="status-badge" :class="statusClass(step.status)">{{ statusLabel(step.status) }}</span>
                      </td>
                      <td class="px-3 py-2 text-xs text-gray-500 break-all">
                        <div v-if="step.details" class="whitespace-pre-wrap">{{ step.details }}</div>
                        <div v-if="step.error" class="text-red-600 mt-1">{{ step.error }}</div>
                      </td>
                      <td class="px-3 py-2 text-xs text-gray-500">{{ step.duration ? step.duration + ' ms' : '-' }}</td>
                    </tr>
                  </tbody>
                </table>
              </div>
              <div v-else class="text-gray-400 italic text-center mt-4">No steps recorded</div>
            </div>

            <div v-else-if="currentTab === 'body'">
              <div class="flex justify-between items-center mb-2">
                <span class="text-xs text-gray-500">Response body</span>
                <button v-if="selectedItem.responseBody" class="text-xs text-blue-600 hover:underline" @click="formatJson = !formatJson">
                  {{ formatJson ? 'Raw' : 'Format' }}
                </button>
              </div>
              <div v-if="!selectedItem.responseBody" class="text-gray-400 italic p-4 text-center border border-dashed border-gray-200 rounded">No response body</div>
              <pre v-else class="bg-gray-50 p-3 rounded border border-gray-100 text-xs overflow-x-auto">{{ formatBody(selectedItem.responseBody, formatJson) }}</pre>
            </div>

            <div v-else-if="currentTab === 'header'">
              <h4 class="text-xs font-bold text-gray-700 mb-2">Request headers</h4>
              <div v-if="hasEntries(selectedItem.requestHeaders)" class="space-y-1 mb-4">
                <div v-for="(val, key) in selectedItem.requestHeaders" :key="key" class="grid grid-cols-3 gap-2 border-b border-gray-50 pb-1">
                  <span class="text-gray-500 col-span-1 truncate" :title="key">{{ key }}</span>
                  <span class="text-gray-900 col-span-2 break-all">{{ val }}</span>
                </div>
              </div>
              <div v-else class="text-gray-400 italic">No request headers</div>

              <h4 class="text-xs font-bold text-gray-700 mb-2 mt-4">Response headers</h4>
              <div v-if="hasEntries(selectedItem.responseHeaders)" class="space-y-1">
                <div v-for="(val, key) in selectedItem.responseHeaders" :key="key" class="grid grid-cols-3 gap-2 border-b border-gray-50 pb-1">
                  <span class="text-gray-500 col-span-1 truncate" :title="key">{{ key }}</span>
                  <span class="text-gray-900 col-span-2 break-all">{{ val }}</span>
                </div>
              </div>
              <div v-else class="text-gray-400 italic">No response headers</div>
            </div>

            <div v-else-if="currentTab === 'cookie'">
              <div v-if="hasEntries(selectedItem.cookies)" class="space-y-2">
                <div v-for="(val, key) in selectedItem.cookies" :key="key" class="flex justify-between border-b border-gray-50 pb-1">
                  <span class="font-medium text-gray-700">{{ key }}</span>
                  <span class="text-gray-600 truncate max-w-xs" :title="val">{{ val }}</span>
                </div>
              </div>
              <div v-else class="text-gray-400 italic text-center mt-4">No cookies</div>
            </div>

            <div v-else-if="currentTab === 'console'">
              <div v-if="selectedItem.logs && selectedItem.logs.length" class="space-y-1">
                <div v-for="(line, idx) in selectedItem.logs" :key="idx" class="text-xs border-b border-gray-50 pb-0.5 mb-0.5">
                  <span class="text-gray-400 select-none mr-2">{{ idx + 1 }}</span>
                  <span :class="logClass(line)">{{ line }}</span>
                </div>
              </div>
              <div v-else class="text-gray-400 italic text-center mt-4">No console output</div>
            </div>

            <div v-else-if="currentTab === 'request'">
              <div class="mb-4">
                <span class="text-xs text-gray-500 block mb-1">URL</span>
                <div class="bg-gray-50 p-2 rounded border border-gray-100 break-all">{{ selectedItem.url || '-' }}</div>
              </div>
              <div class="mb-4">
                <span class="text-xs text-gray-500 block mb-1">Method</span>
                <div class="bg-gray-50 p-2 rounded border border-gray-100 inline-block">{{ selectedItem.method || '-' }}</div>
              </div>
              <div>
                <span class="text-xs text-gray-500 block mb-1">Request body</span>
                <pre class="bg-gray-50 p-3 rounded border border-gray-100 text-xs overflow-x-auto">{{ formatBody(selectedItem.requestBody, true) || '-' }}</pre>
              </div>
            </div>
          </div>
        </div>
      </div>
    </main>
  </div>"#;

const RUNTIME_SCRIPT: &str = r#"
    (function () {
      var fallback = document.getElementById('static-report');
      if (!window.Vue) {
        return;
      }
      var data = window.REPORT_DATA || {};
      var meta = window.REPORT_META || {};
      var { createApp, ref, computed, onMounted, nextTick } = Vue;

      var app = createApp({
        setup() {
          const planSummary = data.planSummary || {};
          const planItems = data.planItems || [];
          const reportDetail = data.reportDetail || {};

          const currentFilter = ref('all');
          const searchQuery = ref('');
          const selectedIndex = ref(null);
          const currentTab = ref('body');
          const formatJson = ref(true);
          const chartRef = ref(null);

          const filters = ['all', 'success', 'failed'];
          const filterLabels = { all: 'All', success: 'Passed', failed: 'Failed' };
          const tabs = [
            { id: 'steps', label: 'Steps' },
            { id: 'body', label: 'Response Body' },
            { id: 'cookie', label: 'Cookies' },
            { id: 'header', label: 'Headers' },
            { id: 'console', label: 'Console' },
            { id: 'request', label: 'Request' }
          ];

          const successRate = computed(() => {
            if (!planSummary.total) return 0;
            return Math.round(((planSummary.success || 0) * 10000) / planSummary.total) / 100;
          });

          const avgDuration = computed(() => planSummary.avgDurationMs || 0);

          const filteredItems = computed(() => {
            const q = searchQuery.value.toLowerCase();
            return planItems
              .map((item, index) => ({ item, index }))
              .filter(({ item }) => currentFilter.value === 'all' || item.status === currentFilter.value)
              .filter(({ item }) => !q ||
                (item.caseName && item.caseName.toLowerCase().includes(q)) ||
                (item.url && item.url.toLowerCase().includes(q)));
          });

          const getFilterCount = (filter) => {
            if (filter === 'all') return planItems.length;
            return planItems.filter(i => i.status === filter).length;
          };

          const selectedItem = computed(() =>
            selectedIndex.value === null ? null : planItems[selectedIndex.value] || null);

          const selectItem = (index) => {
            if (index < 0 || index >= planItems.length) return;
            selectedIndex.value = index;
            currentTab.value = 'steps';
          };

          const clearSelection = () => {
            selectedIndex.value = null;
          };

          const valueText = (v) => (v === null || v === undefined || v === '') ? '-' : String(v);

          const displayName = (item) => item.caseName || item.url || ('Case #' + valueText(item.caseId));

          const statusLabel = (status) => status === 'success' ? 'Passed' : status === 'failed' ? 'Failed' : valueText(status);

          const statusClass = (status) => status === 'success' ? 'status-success' : status === 'failed' ? 'status-failed' : 'status-other';

          const formatDuration = (ms) => {
            if (ms === null || ms === undefined) return '-';
            if (ms < 1000) return ms + ' ms';
            return (ms / 1000).toFixed(2) + ' s';
          };

          const formatSize = (bytes) => {
            if (!bytes) return '-';
            if (bytes < 1024) return bytes + ' B';
            return (bytes / 1024).toFixed(2) + ' KB';
          };

          const formatEnvironment = (env) => {
            const map = { dev: 'Development', staging: 'Staging', production: 'Production' };
            return map[env] || env;
          };

          const formatBody = (body, pretty) => {
            if (body === null || body === undefined || body === '') return '';
            if (typeof body !== 'string') {
              return pretty ? JSON.stringify(body, null, 2) : JSON.stringify(body);
            }
            if (pretty) {
              try {
                return JSON.stringify(JSON.parse(body), null, 2);
              } catch (e) {}
            }
            return body;
          };

          const logClass = (line) => {
            const lower = String(line).toLowerCase();
            if (lower.includes('error') || lower.includes('fail')) return 'log-error';
            if (lower.includes('success') || lower.includes('pass')) return 'log-success';
            return 'log-neutral';
          };

          const hasEntries = (obj) => !!obj && Object.keys(obj).length > 0;

          const initChart = () => {
            if (!chartRef.value || !window.echarts) return;
            const chart = window.echarts.init(chartRef.value);
            chart.setOption({
              series: [
                {
                  type: 'pie',
                  radius: ['70%', '90%'],
                  avoidLabelOverlap: false,
                  label: { show: false },
                  data: [
                    { value: planSummary.success || 0, name: 'Passed', itemStyle: { color: '#10b981' } },
                    { value: planSummary.failed || 0, name: 'Failed', itemStyle: { color: '#ef4444' } }
                  ]
                }
              ]
            });
            window.addEventListener('resize', () => chart.resize());
          };

          onMounted(() => {
            nextTick(() => {
              try {
                initChart();
              } catch (e) {
                console.warn('Chart unavailable', e);
              }
            });
          });

          return {
            meta,
            planSummary,
            planItems,
            reportDetail,
            successRate,
            avgDuration,
            currentFilter,
            searchQuery,
            filteredItems,
            filters,
            filterLabels,
            getFilterCount,
            selectedIndex,
            selectedItem,
            selectItem,
            clearSelection,
            tabs,
            currentTab,
            formatJson,
            chartRef,
            valueText,
            displayName,
            statusLabel,
            statusClass,
            formatDuration,
            formatSize,
            formatEnvironment,
            formatBody,
            logClass,
            hasEntries
          };
        }
      });

      try {
        app.mount('#app');
        if (fallback) {
          fallback.remove();
        }
      } catch (e) {
        console.error('Report view failed to mount', e);
      }
    })();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Body, PlanItem, PlanSummary};

    fn options() -> RenderOptions {
        RenderOptions {
            cdn: CdnUrls::default(),
            generated_at: "2026-10-18 09:30:00".to_string(),
            exported_by: Some("qa-lead".to_string()),
        }
    }

    fn sample() -> ReportPayload {
        ReportPayload {
            plan_summary: Some(PlanSummary {
                plan_id: Some(12.into()),
                plan_name: Some("Checkout API".into()),
                environment: Some("staging".into()),
                total: Some(2),
                success: Some(1),
                failed: Some(1),
                duration_ms: Some(2340),
                ..Default::default()
            }),
            plan_items: vec![
                PlanItem {
                    case_name: Some("Create cart".into()),
                    method: Some("POST".into()),
                    url: Some("https://shop.example.com/cart".into()),
                    status: ItemStatus::Success,
                    status_code: Some(201),
                    duration_ms: Some(87),
                    response_body: Some(Body::RawText(r#"{"id":"c-1"}"#.into())),
                    ..Default::default()
                },
                PlanItem {
                    case_name: Some("Pay <script>alert(1)</script>".into()),
                    method: Some("POST".into()),
                    status: ItemStatus::Failed,
                    status_code: Some(502),
                    duration_ms: Some(1200),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    /// Pull the embedded JSON literal back out of a generated document.
    fn extract_data(html: &str) -> &str {
        let start = html.find("window.REPORT_DATA = ").unwrap() + "window.REPORT_DATA = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        &html[start..end]
    }

    #[test]
    fn test_document_structure() {
        let html = generate_report_html(&sample(), &options()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test Report - Checkout API</title>"));
        assert!(html.contains(r#"<script src="https://unpkg.com/vue@3/dist/vue.global.prod.js"></script>"#));
        assert!(html.contains(r#"<script src="https://cdn.tailwindcss.com"></script>"#));
        assert!(html.contains("echarts@5.4.3"));
        assert!(html.contains(r#"<div id="app" v-cloak"#));
        assert!(html.contains(r#"<div id="static-report">"#));
        assert!(html.contains("\"exportedBy\":\"qa-lead\""));
    }

    #[test]
    fn test_script_payload_round_trips() {
        let payload = sample();
        let html = generate_report_html(&payload, &options()).unwrap();

        // the only closing script tags are the two the template writes itself
        let data_block = &html[html.find("window.REPORT_DATA").unwrap()..];
        assert_eq!(data_block.matches("</script>").count(), 2);

        let back = ReportPayload::from_json_str(extract_data(&html)).unwrap();
        assert_eq!(back, payload);
        assert_eq!(
            back.plan_items[1].case_name.as_deref(),
            Some("Pay <script>alert(1)</script>")
        );
    }

    #[test]
    fn test_backend_only_fields_reach_the_document() {
        let payload = ReportPayload::from_json_str(
            r#"{"planSummary":{"planName":"Nightly","planSummaryReportId":99},"planItems":[{"status":"success","executedAt":"2024-05-01 10:00:00"}]}"#,
        )
        .unwrap();
        let html = generate_report_html(&payload, &options()).unwrap();
        let data: serde_json::Value = serde_json::from_str(extract_data(&html)).unwrap();
        assert_eq!(data["planSummary"]["planSummaryReportId"], 99);
        assert_eq!(data["planItems"][0]["executedAt"], "2024-05-01 10:00:00");
    }

    #[test]
    fn test_fallback_table_is_escaped_and_formatted() {
        let html = generate_report_html(&sample(), &options()).unwrap();
        assert!(html.contains("Pay &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<td>87 ms</td>"));
        assert!(html.contains("<td>1.20 s</td>"));
        assert!(html.contains(r#"<span class="text-error">502</span>"#));
        assert!(html.contains("Duration: 2.34 s"));
    }

    #[test]
    fn test_missing_summary_and_items() {
        let html = generate_report_html(&ReportPayload::default(), &RenderOptions::default()).unwrap();
        assert!(html.contains("<title>Test Report</title>"));
        assert!(html.contains("Plan ID: - &middot; Total: -"));
        assert!(html.contains("No test cases in this report"));
        assert!(html.contains("\"exportedBy\":null"));
        assert_eq!(
            extract_data(&html),
            r#"{"planItems":[],"reportDetail":{}}"#
        );
    }

    #[test]
    fn test_custom_cdn_urls() {
        let mut opts = options();
        opts.cdn.echarts = "https://mirror.internal/echarts.js?v=5&min=1".into();
        let html = generate_report_html(&sample(), &opts).unwrap();
        assert!(html.contains(r#"<script src="https://mirror.internal/echarts.js?v=5&amp;min=1"></script>"#));
    }

    #[test]
    fn test_runtime_guards_missing_libraries() {
        assert!(RUNTIME_SCRIPT.contains("if (!window.Vue)"));
        assert!(RUNTIME_SCRIPT.contains("!window.echarts"));
        assert!(RUNTIME_SCRIPT.contains("window.addEventListener('resize'"));
        assert!(RUNTIME_SCRIPT.contains("currentTab.value = 'steps'"));
    }
}
