#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui_pagebuilder::{
    Element, ElementAction, ElementContext, PageBehavior, PageBuilder, PageEditor, PropValue,
    WidgetRegistry,
};

struct DemoBehavior;

impl PageBehavior for DemoBehavior {
    fn element_ui(
        &mut self,
        ui: &mut egui::Ui,
        element: &Element,
        context: &ElementContext,
    ) -> ElementAction {
        let mut action = ElementAction::None;
        ui.horizontal(|ui| {
            let label = element
                .content
                .get("text")
                .and_then(|value| value.as_text())
                .map(|text| format!("{}: {text}", element.kind))
                .unwrap_or_else(|| element.kind.to_string());
            let text = if context.is_selected {
                egui::RichText::new(label).strong()
            } else {
                egui::RichText::new(label)
            };

            // The header doubles as grab handle and selection target.
            let header = ui.add(egui::Button::new(text).sense(egui::Sense::click_and_drag()));
            if header.clicked() {
                action = ElementAction::Select;
            }
            if header.drag_started() {
                action = ElementAction::Drag;
            }

            if context.is_selected {
                if context.can_move_up && ui.small_button("move up").clicked() {
                    action = ElementAction::MoveUp;
                }
                if context.can_move_down && ui.small_button("move down").clicked() {
                    action = ElementAction::MoveDown;
                }
                if ui.small_button("duplicate").clicked() {
                    action = ElementAction::Duplicate;
                }
                if ui.small_button("delete").clicked() {
                    action = ElementAction::Delete;
                }
            }
        });
        action
    }
}

struct DemoApp {
    editor: PageEditor,
    behavior: DemoBehavior,
}

impl DemoApp {
    fn new() -> Self {
        let registry = WidgetRegistry::with_builtin_widgets();

        let mut builder = PageBuilder::new(&registry);
        let title = builder.widget("heading");
        let intro = builder.widget("text");
        let hero = builder.container("section", vec![title, intro]);
        let left = builder.widget("image");
        let right = builder.widget("text");
        let left_column = builder.container("column", vec![left]);
        let right_column = builder.container("column", vec![right]);
        let columns = builder.container("flex-container", vec![left_column, right_column]);
        let tree = builder.finish(vec![hero, columns]);

        Self {
            editor: PageEditor::with_tree(tree, registry),
            behavior: DemoBehavior,
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("palette").show(ctx, |ui| {
            ui.heading("Widgets");
            ui.label("Drag onto the canvas:");
            ui.separator();

            let kinds: Vec<_> = self.editor.registry.palette_kinds().to_vec();
            for kind in kinds {
                let title = self
                    .editor
                    .registry
                    .spec(&kind)
                    .map_or_else(|| kind.to_string(), |spec| spec.title.clone());
                let entry = ui.add(egui::Button::new(title).sense(egui::Sense::click_and_drag()));
                if entry.drag_started() {
                    self.editor.begin_palette_drag(kind);
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    self.editor.undo();
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    self.editor.redo();
                }
            });
        });

        egui::SidePanel::right("properties").show(ctx, |ui| {
            ui.heading("Properties");
            let Some(id) = self.editor.selected_element_id().cloned() else {
                ui.weak("Select an element");
                return;
            };
            let current = self
                .editor
                .tree()
                .get(&id)
                .and_then(|element| element.content.get("text"))
                .and_then(|value| value.as_text())
                .map(str::to_owned);
            if let Some(mut text) = current {
                ui.label("Text");
                if ui.text_edit_singleline(&mut text).changed() {
                    let _ = self
                        .editor
                        .update_content(&id, [("text".to_owned(), PropValue::Text(text))]);
                }
            } else {
                ui.weak("No editable text");
            }
            ui.separator();
            if ui.button("Deselect").clicked() {
                self.editor.clear_selection();
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.editor.ui(ui, &mut self.behavior);
            });
        });
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    eframe::run_native(
        "egui_pagebuilder demo",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(DemoApp::new()))),
    )
}
