//! Instructions for composing a pattern script from scratch

/// Generates the instruction block for new compositions
///
/// # Examples
///
/// ```
/// use audial::prompts::new_prompt::generate_new_prompt;
///
/// let prompt = generate_new_prompt();
/// assert!(prompt.contains("NEW"));
/// ```
pub fn generate_new_prompt() -> String {
    r#"You are composing a NEW pattern script from scratch.

TASK:
- Write a complete piece that answers the request below
- Choose a tonal center and keep every voice consistent with it
- Give each voice one clear role: harmony, bass, melody, texture or drums

PRIORITIES (in this order): harmony, rhythm, texture, atmosphere
- Drums alone are not a song; always include a harmonic bed and a bass
- Stacked chords carry harmony: note("<[c3,eb3,g3] [ab2,c3,eb3]>")
- The bass outlines chord roots; pads hold long notes
- Keep 3 to 6 voices and let no single voice dominate the mix

ARRANGEMENT:
- Think in sections (intro, main, variation, breakdown, return)
- Build sections with transforms instead of copied lines:
  .every(4, x => x.rev()), .sometimes(x => x.fast(2)), .off(0.5, x => x.add(12))
- For a breakdown, thin the drums, lower the lpf and slow the pad
- Keep parts stable and change one element at a time

STARTING POINT (edit freely):
setcpm(120)

// pad
$: note("<[c3,eb3,g3] [ab2,c3,eb3] [bb2,d3,f3] [c3,eb3,g3]>").s("triangle").lpf(800).gain(0.3).slow(4)

// bass
$: note("c2 ~ c2 eb2 ~ bb1 c2 ~").s("sine").lpf(250).gain(0.4)

// drums
$: s("bd ~ bd ~").gain(0.6)
$: s("~ sd ~ sd").gain(0.45)
$: s("hh*8").gain(0.25)

DO NOT:
- Reuse the current editor contents
- Copy a reference verbatim; borrow its techniques instead"#
        .to_string()
}
