//! Turning change notifications into frames for a display

use crate::events::{Event, EventBus, Topic};
use crate::models::{Project, SortCriteria, Task};
use crate::store::{Clock, visible_tasks};
use chrono::NaiveDate;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// One snapshot of what the user should see
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Heading, the selected project name
    pub title: String,
    pub projects: Vec<Project>,
    pub current: String,
    pub sort: SortCriteria,
    /// Visible tasks in sort order
    pub tasks: Vec<Task>,
    /// Size of the whole task list before filtering
    pub total: usize,
    pub today: NaiveDate,
}

impl Frame {
    /// Categories a new task may be filed under
    pub fn assignable_projects(&self) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.is_assignable()).collect()
    }
}

/// Something that can draw a [`Frame`]
pub trait RenderSink {
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()>;
}

/// Keeps every frame it is given
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Vec<Frame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// The renderer's view cache, fed only from event payloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub current: String,
    pub sort: SortCriteria,
}

impl RenderState {
    fn apply(&mut self, event: &Event) {
        match event {
            Event::TasksUpdated(tasks) => self.tasks = tasks.clone(),
            Event::ProjectsUpdated { projects, current } => {
                self.projects = projects.clone();
                self.current = current.clone();
            }
            Event::TasksFilterChanged(current) => self.current = current.clone(),
            Event::SortCriteriaChanged(sort) => self.sort = *sort,
        }
    }
}

/// Observer that redraws on every change notification.
///
/// It never touches the stores, so handlers can run while a store is
/// mid-mutation.
pub struct Renderer<S: RenderSink> {
    state: RefCell<RenderState>,
    sink: RefCell<S>,
    clock: Clock,
    renders: Cell<usize>,
}

impl<S: RenderSink + 'static> Renderer<S> {
    /// Subscribe to every topic on `bus` and draw the initial frame
    pub fn attach(bus: &EventBus, state: RenderState, sink: S, clock: Clock) -> Rc<Self> {
        let renderer = Rc::new(Renderer {
            state: RefCell::new(state),
            sink: RefCell::new(sink),
            clock,
            renders: Cell::new(0),
        });

        for topic in Topic::ALL {
            let observer = Rc::clone(&renderer);
            bus.subscribe(topic, move |event| observer.on_event(event));
        }

        if let Err(e) = renderer.draw() {
            log::error!("Initial render failed: {:#}", e);
        }
        renderer
    }

    /// The frame the current cache produces
    pub fn frame(&self) -> Frame {
        let state = self.state.borrow();
        let today = (self.clock)();
        Frame {
            title: state.current.clone(),
            projects: state.projects.clone(),
            current: state.current.clone(),
            sort: state.sort,
            tasks: visible_tasks(&state.tasks, &state.current, today),
            total: state.tasks.len(),
            today,
        }
    }

    /// How many frames have been drawn
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    pub fn sink(&self) -> Ref<'_, S> {
        self.sink.borrow()
    }

    fn on_event(&self, event: &Event) -> anyhow::Result<()> {
        self.state.borrow_mut().apply(event);
        self.draw()
    }

    fn draw(&self) -> anyhow::Result<()> {
        let frame = self.frame();
        let mut sink = self
            .sink
            .try_borrow_mut()
            .map_err(|_| anyhow::anyhow!("render sink is already drawing"))?;
        self.renders.set(self.renders.get() + 1);
        sink.render(&frame)
    }
}
