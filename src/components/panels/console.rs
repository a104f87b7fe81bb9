use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};

use crate::controller::use_controller;
use crate::diagram::{Coordinator, Intent};
use crate::format::render_markdown;
use crate::query::{QueryView, ResultTable, shape};

#[derive(Clone, Debug, PartialEq)]
enum QueryState {
	Idle,
	Running,
	Table(ResultTable),
	/// The result went to the diagram.
	Graph(usize),
	Failed(String),
}

fn result_table(table: ResultTable) -> impl IntoView {
	let head = table
		.columns
		.into_iter()
		.map(|c| view! { <th>{c}</th> })
		.collect_view();
	let body = table
		.rows
		.into_iter()
		.map(|row| {
			let cells = row.into_iter().map(|v| view! { <td>{v}</td> }).collect_view();
			view! { <tr>{cells}</tr> }
		})
		.collect_view();
	view! {
		<div class="result-count">{format!("{} result(s)", table.count)}</div>
		<table class="result-table">
			<thead><tr>{head}</tr></thead>
			<tbody>{body}</tbody>
		</table>
	}
}

/// Query text the console box mirrors: the last one a committed payload carried.
fn mirrored_query(coordinator: &Coordinator) -> Option<String> {
	coordinator.last_query().map(str::to_string)
}

/// Free-form query box. Tabular results stay here; graph results replace
/// the diagram.
#[component]
pub fn QueryConsole() -> impl IntoView {
	let controller = use_controller();
	let text = RwSignal::new(String::new());
	let state = RwSignal::new(QueryState::Idle);

	// Memoised so selection or theme changes don't clobber what the user typed.
	let last_query = Memo::new(move |_| controller.with(mirrored_query));
	Effect::new(move |_| {
		if let Some(q) = last_query.get() {
			text.set(q);
		}
	});

	let run = move || {
		let query = text.get_untracked().trim().to_string();
		if query.is_empty() {
			return;
		}
		state.set(QueryState::Running);
		let api = controller.api();
		spawn_local(async move {
			let next = match api.run_query(&query).await {
				Ok(response) => match shape(response) {
					QueryView::Table(table) => QueryState::Table(table),
					QueryView::Graph { graph, count } => {
						debug!("query returned a graph of {} nodes", graph.nodes.len());
						controller.dispatch(Intent::ShowGraph(graph));
						QueryState::Graph(count)
					}
				},
				Err(e) => {
					error!("query error: {e}");
					QueryState::Failed(e.message().to_string())
				}
			};
			state.try_set(next);
		});
	};

	let results = move || match state.get() {
		QueryState::Idle => ().into_any(),
		QueryState::Running => view! { <div class="loading">"Running query..."</div> }.into_any(),
		QueryState::Table(table) => result_table(table).into_any(),
		QueryState::Graph(count) => {
			view! { <div class="result-count">{format!("{count} result(s) shown in the diagram")}</div> }
				.into_any()
		}
		QueryState::Failed(message) => {
			view! { <div class="inline-error">{format!("Error: {message}")}</div> }.into_any()
		}
	};

	view! {
		<div class="query-console">
			<textarea
				class="query-input"
				placeholder="MATCH (n) RETURN n LIMIT 25"
				prop:value=text
				on:input=move |ev| text.set(event_target_value(&ev))
			></textarea>
			<button class="run-query" on:click=move |_| run()>"Run"</button>
			<div class="query-results">{results}</div>
		</div>
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
	User,
	Assistant,
}

impl Role {
	fn css_class(self) -> &'static str {
		match self {
			Role::User => "chat-message user",
			Role::Assistant => "chat-message assistant",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
enum ChatBody {
	Text(String),
	/// Sanitised markdown.
	Html(String),
	Thinking,
	Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
struct ChatMessage {
	id: u64,
	role: Role,
	body: ChatBody,
}

/// Replace the body of a pending message once its answer arrives.
fn settle(messages: &mut [ChatMessage], id: u64, body: ChatBody) {
	if let Some(msg) = messages.iter_mut().find(|m| m.id == id) {
		msg.body = body;
	}
}

fn message_view(msg: ChatMessage) -> impl IntoView {
	let content = match msg.body {
		ChatBody::Text(text) => view! { <div class="message-content">{text}</div> }.into_any(),
		ChatBody::Html(html) => view! { <div class="message-content" inner_html=html></div> }.into_any(),
		ChatBody::Thinking => view! { <div class="message-content thinking">"Thinking..."</div> }.into_any(),
		ChatBody::Failed(message) => view! {
			<div class="message-content inline-error">
				{format!("Sorry, I encountered an error. Please try again. ({message})")}
			</div>
		}
		.into_any(),
	};
	view! { <div class=msg.role.css_class()>{content}</div> }
}

/// Conversation with the backend assistant; answers may carry a diagram.
#[component]
pub fn ChatPanel() -> impl IntoView {
	let controller = use_controller();
	let input = RwSignal::new(String::new());
	let messages = RwSignal::new(Vec::<ChatMessage>::new());
	let next_id = StoredValue::new(0u64);

	let send = move || {
		let message = input.get_untracked().trim().to_string();
		if message.is_empty() {
			return;
		}
		input.set(String::new());
		let (user_id, reply_id) = {
			let base = next_id.get_value();
			next_id.set_value(base + 2);
			(base, base + 1)
		};
		messages.update(|m| {
			m.push(ChatMessage {
				id: user_id,
				role: Role::User,
				body: ChatBody::Text(message.clone()),
			});
			m.push(ChatMessage {
				id: reply_id,
				role: Role::Assistant,
				body: ChatBody::Thinking,
			});
		});

		let api = controller.api();
		spawn_local(async move {
			let body = match api.chat(&message).await {
				Ok(response) => {
					if let Some(graph) = response.graph_data.filter(|g| !g.nodes.is_empty()) {
						controller.dispatch(Intent::ShowGraph(graph));
					}
					ChatBody::Html(render_markdown(&response.response))
				}
				Err(e) => {
					error!("chat error: {e}");
					ChatBody::Failed(e.message().to_string())
				}
			};
			messages.try_update(|m| settle(m, reply_id, body));
		});
	};

	view! {
		<div class="chat-panel">
			<div class="chat-messages">
				<For each=move || messages.get() key=|m| (m.id, matches!(m.body, ChatBody::Thinking)) let:msg>
					{message_view(msg)}
				</For>
			</div>
			<div class="chat-input-row">
				<input
					class="chat-input"
					type="text"
					placeholder="Ask about the ontology..."
					prop:value=input
					on:input=move |ev| input.set(event_target_value(&ev))
					on:keypress=move |ev: leptos::ev::KeyboardEvent| {
						if ev.key() == "Enter" {
							send();
						}
					}
				/>
				<button class="chat-send" on:click=move |_| send()>"Send"</button>
			</div>
		</div>
	}
}
