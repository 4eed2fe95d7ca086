pub const WELCOME_TEXT: &str = "Quick Decision Trainer trains your brain to take quick decisions \
using simple math. Keep x inside the range while numbered blocks fall towards your paddle. \
If you are new to the game, take the tutorial first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialPage {
    pub title: String,
    pub body: String,
}

impl TutorialPage {
    pub fn new<S: Into<String>>(title: S, body: S) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tutorial {
    pub pages: Vec<TutorialPage>,
}

impl Tutorial {
    pub fn builtin() -> Self {
        let pages = vec![
            TutorialPage::new(
                "The goal",
                "Every round you get a number x. Your job is to keep x between a lower \
                 limit and an upper limit, shown as rmn <= x <= rmx.",
            ),
            TutorialPage::new(
                "The equation",
                "Each round a random y is added to x. You choose a z to subtract, so the \
                 next x is x + y - z. Pick z so that the result stays inside the limits.",
            ),
            TutorialPage::new(
                "Catching blocks",
                "Between three and five numbered blocks fall from the top. Move the paddle \
                 with the left and right arrow keys and catch the block holding your z. \
                 Leaving the paddle off every block means z = 0.",
            ),
            TutorialPage::new(
                "Shifting limits",
                "After a round the limits may move around the new x. Read them again \
                 before every catch. When x + y is already inside the limits, catching \
                 nothing is a safe move.",
            ),
            TutorialPage::new(
                "Speed control",
                "Press 1, 2 or 3 during a game to switch between slow, medium and fast \
                 blocks. Faster blocks leave you less time to decide.",
            ),
            TutorialPage::new(
                "Winning",
                "Survive until the countdown reaches zero and you win. One wrong catch \
                 ends the game. Press q to give up a game early.",
            ),
        ];

        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn navigator(&self) -> TutorialNavigator<'_> {
        TutorialNavigator {
            tutorial: self,
            index: 0,
        }
    }
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Cursor over the pages of a tutorial.
#[derive(Debug, Clone)]
pub struct TutorialNavigator<'a> {
    tutorial: &'a Tutorial,
    index: usize,
}

impl<'a> TutorialNavigator<'a> {
    pub fn current(&self) -> Option<&'a TutorialPage> {
        self.tutorial.pages.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.tutorial.len()
    }

    /// Returns false when already on the last page.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn progress(&self) -> String {
        format!("{}/{}", self.index + 1, self.tutorial.len())
    }
}
