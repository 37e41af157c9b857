use serde_json::Value;

use super::apm_schema::SchemaDescription;
use super::query_classifier::QueryClassification;
use crate::core::client::search_response::ExecutionResult;
use crate::domain::time::time_window::ResolvedTimeWindow;

/// Buckets listed in the aggregation digest.
const DIGEST_TOP_BUCKETS: usize = 5;

/// Prompt asking the model to write a DSL query for `question`.
pub fn compose_generation_prompt(
    question: &str,
    window: &ResolvedTimeWindow,
    schema: &SchemaDescription,
) -> String {
    format!(
        r#"你是一个专业的Elasticsearch DSL生成专家。根据用户的APM查询需求，生成对应的Elasticsearch DSL查询。

APM数据结构:
{indices}

主要字段:
{fields}

时间范围: {start} 到 {end} (时区: {tz})

用户查询: {question}

请生成标准的Elasticsearch DSL查询，要求:
1. 必须在 query.bool.filter 中包含 @timestamp 的 range 过滤，gte 为 "{start}"，lte 为 "{end}"
2. 根据查询类型选择合适的字段（错误类查询使用 error.* 字段，性能类查询使用 transaction.duration.us）
3. 包含必要的聚合查询；只需要聚合结果时设置 "size": 0
4. terms 聚合的 order 只能使用 "_count"、"_key" 或同级子聚合的名称（例如 "avg_duration"），不能直接使用文档字段名（例如 "transaction.duration.us"）
5. 只返回JSON格式的DSL，不要包含注释、解释或多余文字，不要使用尾随逗号

DSL查询:
"#,
        indices = schema.index_lines(),
        fields = schema.field_lines(),
        start = window.start.to_rfc3339(),
        end = window.end.to_rfc3339(),
        tz = window.timezone.name(),
        question = question,
    )
}

/// Prompt asking the model to explain `result` to the user in plain Chinese.
pub fn compose_analysis_prompt(
    question: &str,
    result: &ExecutionResult,
    classification: QueryClassification,
) -> String {
    let document = serde_json::to_string_pretty(&result.to_value())
        .unwrap_or_else(|_| result.to_value().to_string());
    let digest = summarize_aggregations(&result.aggregations)
        .map(|d| format!("\n聚合摘要:\n{}\n", d))
        .unwrap_or_default();

    format!(
        r#"你是一个APM数据分析专家。用户询问了关于系统性能的问题，我已经执行了Elasticsearch查询并获得了结果。请根据查询结果给出专业的分析和建议。

用户原始问题: {question}

查询结果概述:
- 查询耗时: {took}ms
- 总记录数: {total}
- 样本文档数: {sampled}
- 查询类型: {classification}
{digest}
详细查询结果:
{document}

请根据以上结果提供:
1. 直接回答用户的问题
2. 关键数据的解读和分析
3. 如果发现异常情况，提供可能的原因和建议
4. 用中文回复，语言要简洁易懂，避免技术术语

分析回复:
"#,
        question = question,
        took = result.took,
        total = describe_total(result),
        sampled = result.sampled_hits().len(),
        classification = classification,
        digest = digest,
        document = document,
    )
}

/// Exact totals print as-is; lower bounds and skipped counts are marked `≥`.
fn describe_total(result: &ExecutionResult) -> String {
    if result.total_is_exact() {
        result.total_hits().to_string()
    } else {
        format!("≥{} (未精确统计，请以聚合结果为准)", result.total_hits())
    }
}

/// Short digest of well-known aggregation shapes; `None` when nothing is recognized.
pub fn summarize_aggregations(aggs: &Value) -> Option<String> {
    let service_key = ["services", "service_stats"]
        .into_iter()
        .find(|k| aggs.get(*k).is_some());

    if let Some(key) = service_key {
        let buckets = aggs[key].get("buckets").and_then(Value::as_array)?;
        if buckets.is_empty() {
            return None;
        }
        let lines: Vec<String> = buckets
            .iter()
            .take(DIGEST_TOP_BUCKETS)
            .map(|bucket| {
                let name = bucket
                    .get("key")
                    .map(|k| k.as_str().map(str::to_string).unwrap_or_else(|| k.to_string()))
                    .unwrap_or_else(|| "未知服务".to_string());
                match bucket.pointer("/avg_duration/value").and_then(Value::as_f64) {
                    Some(us) => format!("{}: 平均响应时间 {}ms", name, micros_to_millis(us)),
                    None => {
                        let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
                        format!("{}: {} 次调用", name, count)
                    }
                }
            })
            .collect();
        return Some(lines.join("\n"));
    }

    aggs.pointer("/avg_duration/value")
        .and_then(Value::as_f64)
        .map(|us| format!("平均响应时间: {}ms", micros_to_millis(us)))
}

fn micros_to_millis(us: f64) -> f64 {
    (us / 10.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::time_window::resolve_at;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn window() -> ResolvedTimeWindow {
        resolve_at("1h", "UTC", Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
    }

    #[test]
    fn generation_prompt_embeds_question_window_and_schema() {
        let prompt = compose_generation_prompt(
            "哪个服务最慢？",
            &window(),
            &SchemaDescription::default(),
        );
        assert!(prompt.contains("用户查询: 哪个服务最慢？"));
        assert!(prompt.contains("2024-03-10T11:00:00+00:00"));
        assert!(prompt.contains("2024-03-10T12:00:00+00:00"));
        assert!(prompt.contains("apm-*-error-*"));
        assert!(prompt.contains("- transaction.duration.us: 响应时间(微秒)"));
        assert!(prompt.contains("只返回JSON格式的DSL"));
    }

    #[test]
    fn analysis_prompt_embeds_summary_and_document() {
        let result = ExecutionResult::from_raw(json!({
            "took": 9,
            "hits": {"total": {"value": 120, "relation": "eq"}, "hits": []},
            "aggregations": {"services": {"buckets": [
                {"key": "checkout", "doc_count": 80, "avg_duration": {"value": 123456.0}},
                {"key": "cart", "doc_count": 40, "avg_duration": {"value": 1500.0}}
            ]}}
        }));
        let prompt = compose_analysis_prompt("哪个服务最慢？", &result, QueryClassification::Performance);

        assert!(prompt.contains("- 查询耗时: 9ms"));
        assert!(prompt.contains("- 总记录数: 120"));
        assert!(prompt.contains("- 样本文档数: 0"));
        assert!(prompt.contains("- 查询类型: performance"));
        assert!(prompt.contains("checkout: 平均响应时间 123.46ms"));
        assert!(prompt.contains("\"doc_count\": 80"));
        assert!(prompt.contains("用中文回复"));
    }

    #[test]
    fn analysis_prompt_marks_uncounted_total_as_lower_bound() {
        let result = ExecutionResult::from_raw(json!({
            "took": 4,
            "hits": {"hits": []},
            "aggregations": {"services": {"buckets": [{"key": "checkout", "doc_count": 5000}]}}
        }));
        let prompt = compose_analysis_prompt("各服务调用次数", &result, QueryClassification::Traffic);

        assert!(prompt.contains("- 总记录数: ≥0 (未精确统计，请以聚合结果为准)"));
        assert!(!prompt.contains("- 总记录数: 0\n"));
        assert!(prompt.contains("checkout: 5000 次调用"));
    }

    #[test]
    fn analysis_prompt_keeps_capped_total_as_lower_bound() {
        let result = ExecutionResult::from_raw(json!({
            "hits": {"total": {"value": 10000, "relation": "gte"}, "hits": []}
        }));
        let prompt = compose_analysis_prompt("请求量", &result, QueryClassification::Traffic);
        assert!(prompt.contains("- 总记录数: ≥10000"));
    }

    #[test]
    fn digest_falls_back_to_doc_counts() {
        let aggs = json!({"service_stats": {"buckets": [{"key": "api", "doc_count": 7}]}});
        assert_eq!(summarize_aggregations(&aggs).as_deref(), Some("api: 7 次调用"));
    }

    #[test]
    fn digest_lists_at_most_five_buckets() {
        let buckets: Vec<Value> = (0..8)
            .map(|i| json!({"key": format!("svc-{i}"), "doc_count": i}))
            .collect();
        let digest = summarize_aggregations(&json!({"services": {"buckets": buckets}})).unwrap();
        assert_eq!(digest.lines().count(), 5);
    }

    #[test]
    fn digest_handles_plain_average_and_unknown_shapes() {
        let aggs = json!({"avg_duration": {"value": 2500.0}});
        assert_eq!(summarize_aggregations(&aggs).as_deref(), Some("平均响应时间: 2.5ms"));
        assert!(summarize_aggregations(&json!({"by_host": {"buckets": []}})).is_none());
        assert!(summarize_aggregations(&json!({})).is_none());
    }
}
