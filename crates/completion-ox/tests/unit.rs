#[cfg(test)]
mod tests {
    use completion_ox::{
        ChatCompletionRequest, ChatCompletionStreamResponse, ChatMessage, Client, CompletionError,
        CompletionResponse, Endpoint, FinishReason, Model, Role, StreamUsageOptions, Usage,
    };

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.content, Some("Hello".to_string()));
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.role.to_string(), "user");
    }

    #[test]
    fn test_tool_and_function_messages() {
        let tool = ChatMessage::tool("call_123", "Result: 42");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_123"));

        let function = ChatMessage::function("get_weather", "{\"temp\":21}");
        assert_eq!(function.role, Role::Function);
        assert_eq!(function.name.as_deref(), Some("get_weather"));
    }

    #[test]
    fn test_chat_request_builder_serialization() {
        let request = ChatCompletionRequest::builder()
            .model("gpt-4o-mini")
            .system_message("You are terse")
            .user_message("Hello")
            .temperature(0.5)
            .stream_options(StreamUsageOptions { include_usage: true })
            .build();

        assert_eq!(request.messages.len(), 2);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["stream_options"]["include_usage"], true);
        assert!(value.get("max_tokens").is_none());
        assert!(value.get("stream").is_none());
    }

    #[test]
    fn test_model_endpoint_support() {
        assert!(Model::Gpt4o.supports(Endpoint::ChatCompletions));
        assert!(!Model::Gpt4o.supports(Endpoint::Completions));
        assert!(Model::Gpt3_5TurboInstruct.supports(Endpoint::Completions));
        assert!(!Model::Gpt3_5TurboInstruct.supports(Endpoint::ChatCompletions));

        let custom: Model = "my-finetune".into();
        assert!(matches!(custom, Model::Custom(ref s) if s == "my-finetune"));
        assert!(custom.supports(Endpoint::ChatCompletions));
        assert!(custom.supports(Endpoint::Completions));
        assert_eq!(custom.to_string(), "my-finetune");
    }

    #[test]
    fn test_endpoint_display_matches_path() {
        assert_eq!(Endpoint::ChatCompletions.to_string(), "chat/completions");
        assert_eq!(Endpoint::Completions.to_string(), Endpoint::Completions.path());
    }

    #[test]
    fn test_chat_chunk_fields_match_json() {
        let json = r#"{
            "id": "chatcmpl-9",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-4o-mini",
            "system_fingerprint": "fp_1",
            "choices": [{
                "index": 0,
                "delta": {
                    "role": "assistant",
                    "content": "Hi",
                    "function_call": {"name": "lookup", "arguments": "{\"q\":"}
                },
                "finish_reason": null,
                "content_filter_results": {"hate": {"filtered": false, "severity": "safe"}}
            }]
        }"#;

        let chunk: ChatCompletionStreamResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.id, "chatcmpl-9");
        assert_eq!(chunk.object, "chat.completion.chunk");
        assert_eq!(chunk.created, 1_700_000_000);
        assert_eq!(chunk.model, "gpt-4o-mini");
        assert_eq!(chunk.system_fingerprint.as_deref(), Some("fp_1"));

        let choice = &chunk.choices[0];
        assert_eq!(choice.index, 0);
        assert_eq!(choice.delta.role.as_deref(), Some("assistant"));
        assert_eq!(chunk.content(), Some("Hi"));
        let call = choice.delta.function_call.as_ref().unwrap();
        assert_eq!(call.name, "lookup");
        assert_eq!(call.arguments, "{\"q\":");
        assert!(choice.finish_reason.is_none());
        let hate = choice
            .content_filter_results
            .as_ref()
            .and_then(|results| results.hate.as_ref())
            .unwrap();
        assert!(!hate.filtered);

        assert_eq!(
            chunk.created_at().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_tool_call_fragments() {
        let json = r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"sum","arguments":""}}]},"finish_reason":null}]}"#;
        let chunk: ChatCompletionStreamResponse = serde_json::from_str(json).unwrap();
        let calls = chunk.choices[0].delta.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].index, Some(0));
        assert_eq!(calls[0].id.as_deref(), Some("call_1"));
        assert_eq!(calls[0].function.name, "sum");

        let json = r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"a\":1}"}}]},"finish_reason":"tool_calls"}]}"#;
        let chunk: ChatCompletionStreamResponse = serde_json::from_str(json).unwrap();
        let calls = chunk.choices[0].delta.tool_calls.as_ref().unwrap();
        assert!(calls[0].id.is_none());
        assert_eq!(calls[0].function.arguments, "{\"a\":1}");
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::ToolCalls));
    }

    #[test]
    fn test_finish_reason_strings() {
        let reasons: Vec<FinishReason> =
            serde_json::from_str(r#"["stop","length","content_filter","PlainText","eos"]"#)
                .unwrap();
        assert_eq!(reasons[0], FinishReason::Stop);
        assert_eq!(reasons[2], FinishReason::ContentFilter);
        assert_eq!(reasons[3], FinishReason::PlainText);
        assert_eq!(reasons[4], FinishReason::Other("eos".to_string()));
        assert_eq!(reasons[4].to_string(), "eos");
        assert_eq!(
            serde_json::to_string(&FinishReason::FunctionCall).unwrap(),
            "\"function_call\""
        );
    }

    #[test]
    fn test_completion_chunk_with_usage() {
        let json = r#"{"id":"cmpl-2","object":"text_completion","created":1,"model":"davinci-002","choices":[],"usage":{"prompt_tokens":5,"completion_tokens":7,"total_tokens":12}}"#;
        let chunk: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(chunk.text().is_none());
        assert_eq!(chunk.usage, Some(Usage::new(5, 7)));
    }

    #[test]
    fn test_usage_addition() {
        let total = Usage::new(100, 50) + Usage::new(10, 5);
        assert_eq!(total.prompt_tokens, 110);
        assert_eq!(total.completion_tokens, 55);
        assert_eq!(total.total_tokens, 165);
        assert!(!total.is_cached());
    }

    #[test]
    fn test_client_defaults() {
        let client = Client::new("sk-test");
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.empty_messages_limit, 300);
        assert!(client.organization.is_none());
    }

    #[test]
    fn test_missing_api_key_message() {
        assert_eq!(CompletionError::MissingApiKey.to_string(), "Missing API key");
    }
}
