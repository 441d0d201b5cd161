use madori_ipc::ClientInfo;

/// Snapshot of one live window, as reported by the compositor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub class: Option<String>,
    pub title: Option<String>,
    pub initial_class: Option<String>,
    pub initial_title: Option<String>,
    pub workspace_name: Option<String>,
    pub workspace_id: Option<i64>,
}

impl Window {
    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Default::default()
        }
    }

    pub fn label(&self) -> String {
        match (&self.class, &self.title) {
            (Some(class), Some(title)) if !title.is_empty() => format!("{} - {}", class, title),
            (Some(class), _) => class.clone(),
            (None, Some(title)) => title.clone(),
            (None, None) => "(unnamed window)".to_string(),
        }
    }
}

impl From<ClientInfo> for Window {
    fn from(info: ClientInfo) -> Self {
        Self {
            class: Some(info.class),
            title: Some(info.title),
            initial_class: Some(info.initial_class),
            initial_title: Some(info.initial_title),
            workspace_name: Some(info.workspace.name),
            workspace_id: Some(info.workspace.id),
        }
    }
}
