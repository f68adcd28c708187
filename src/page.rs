pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Acids and Conjugate Bases</title>
    <style>
      html, body { margin: 0; padding: 0; height: 100%; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      #layout { display: flex; gap: 24px; padding: 24px; align-items: flex-start; }
      #panel { width: 320px; background: rgba(10,12,16,0.9); padding: 12px; border: 1px solid #2a2f36; border-radius: 10px; box-shadow: 0 10px 28px rgba(0,0,0,0.35); }
      #infoButton { position: absolute; top: 12px; right: 12px; background: #11151b; border: 1px solid #2a2f36; color: #e6e6e6; border-radius: 8px; padding: 6px 10px; font-size: 12px; text-decoration: none; }
      #infoButton:hover { border-color: #3c6a9e; }
      .brand { font-size: 16px; font-weight: 600; letter-spacing: 0.02em; }
      .section { margin-top: 12px; padding-top: 10px; border-top: 1px solid #1f2630; }
      .section-title { font-size: 11px; text-transform: uppercase; letter-spacing: 0.12em; color: #9aa3ad; margin-bottom: 6px; }
      .row { display: flex; align-items: center; gap: 8px; margin-top: 6px; }
      input { background: #0f141b; color: #e6e6e6; border: 1px solid #2a2f36; border-radius: 6px; padding: 4px 6px; font-size: 12px; }
      input[type="range"] { flex: 1; }
      input[type="text"] { width: 70px; }
      #protonValue { min-width: 24px; text-align: right; font-size: 12px; }
      table { width: 100%; border-collapse: collapse; margin-top: 6px; }
      td { text-align: center; padding: 4px; font-size: 12px; color: #c9d1d9; }
      td.count { font-size: 20px; font-weight: 600; color: #e6e6e6; }
      td.sep { font-size: 22px; color: #7f8895; }
      #status { margin-top: 8px; font-size: 12px; color: #b2bac4; }
      canvas { display: block; background: #10151c; border-radius: 8px; }
    </style>
  </head>
  <body>
    <a id="infoButton" href="/info">Info</a>
    <div id="layout">
      <div id="panel">
        <div class="brand">Acids and Conjugate Bases</div>
        <div class="section">
          <div class="section-title" id="protonLabel"></div>
          <div class="row">
            <input id="protonCount" type="range" />
            <span id="protonValue"></span>
          </div>
        </div>
        <div class="section">
          <div class="section-title" id="phLabel"></div>
          <div class="row">
            <input id="pH" type="text" />
          </div>
        </div>
        <div class="section">
          <div class="section-title" id="tableLabel"></div>
          <table>
            <tr>
              <td><img id="acidSprite" alt="" /></td>
              <td class="sep" rowspan="3" id="separator"></td>
              <td><img id="baseSprite" alt="" /></td>
            </tr>
            <tr>
              <td id="acidLabel"></td>
              <td id="baseLabel"></td>
            </tr>
            <tr>
              <td class="count" id="acidCount">0</td>
              <td class="count" id="baseCount">0</td>
            </tr>
          </table>
        </div>
        <div id="status">Loading...</div>
      </div>
      <canvas id="beaker"></canvas>
    </div>

    <script>
      const canvas = document.getElementById("beaker");
      const ctx = canvas.getContext("2d");
      const sliderEl = document.getElementById("protonCount");
      const sliderValueEl = document.getElementById("protonValue");
      const phEl = document.getElementById("pH");
      const acidCountEl = document.getElementById("acidCount");
      const baseCountEl = document.getElementById("baseCount");
      const statusEl = document.getElementById("status");

      const SPRITE_NAMES = ["beaker", "conjugate_base", "acid", "proton"];
      const sprites = {};
      let sessionId = null;
      let sliderHeld = false;
      let frameInFlight = false;
      let lastFrameAt = 0;

      function loadImage(url) {
        return new Promise((resolve, reject) => {
          const img = new Image();
          img.onload = () => resolve(img);
          img.onerror = () => reject(new Error("failed to load " + url));
          img.src = url;
        });
      }

      async function preload() {
        for (const name of SPRITE_NAMES) {
          sprites[name] = await loadImage(`/assets/${name}.png`);
        }
      }

      function buildViews(views) {
        document.getElementById("protonLabel").textContent = views.labels[0].text;
        document.getElementById("phLabel").textContent = views.labels[1].text;
        document.getElementById("tableLabel").textContent = views.labels[2].text;
        sliderEl.min = views.slider.min;
        sliderEl.max = views.slider.max;
        sliderEl.step = views.slider.step;
        document.getElementById("acidSprite").src = views.table.acid.sprite;
        document.getElementById("baseSprite").src = views.table.conjugate_base.sprite;
        document.getElementById("acidLabel").textContent = views.table.acid.label;
        document.getElementById("baseLabel").textContent = views.table.conjugate_base.label;
        document.getElementById("separator").textContent = views.table.separator;
      }

      // Writing to the controls never fires their change events.
      function applyViews(views) {
        if (!sliderHeld) {
          sliderEl.value = views.slider.value;
        }
        sliderValueEl.textContent = views.slider.value;
        if (document.activeElement !== phEl) {
          phEl.value = views.ph.value;
        }
        acidCountEl.textContent = views.table.acid.count;
        baseCountEl.textContent = views.table.conjugate_base.count;
      }

      async function setup() {
        const res = await fetch("/api/sessions", { method: "POST" });
        if (!res.ok) {
          throw new Error("setup failed: " + res.status);
        }
        const data = await res.json();
        sessionId = data.id;
        canvas.width = data.geometry.width;
        canvas.height = data.geometry.height;
        buildViews(data.views);
        applyViews(data.views);
        statusEl.textContent = "";
      }

      async function sendEdit(control, value) {
        if (!sessionId) {
          return;
        }
        const res = await fetch(`/api/sessions/${sessionId}/edit`, {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ control, value: String(value) }),
        });
        if (res.ok) {
          const data = await res.json();
          applyViews(data.views);
        }
      }

      sliderEl.addEventListener("pointerdown", () => { sliderHeld = true; });
      sliderEl.addEventListener("pointerup", () => { sliderHeld = false; });
      sliderEl.addEventListener("change", () => {
        sliderHeld = false;
        sendEdit("slider", sliderEl.value).catch((err) => { statusEl.textContent = err.toString(); });
      });
      phEl.addEventListener("change", () => {
        sendEdit("ph", phEl.value).catch((err) => { statusEl.textContent = err.toString(); });
      });

      function draw(frame) {
        const g = frame.geometry;
        ctx.clearRect(0, 0, canvas.width, canvas.height);
        ctx.drawImage(sprites.beaker, 0, 0, g.width, g.height);
        for (const p of frame.particles) {
          const img = sprites[p.sprite];
          if (!img) {
            continue;
          }
          const d = p.radius * 2;
          ctx.drawImage(img, p.x - p.radius, p.y - p.radius, d, d);
        }
      }

      async function tick(now) {
        requestAnimationFrame(tick);
        if (frameInFlight || now - lastFrameAt < 33) {
          return;
        }
        frameInFlight = true;
        lastFrameAt = now;
        try {
          const res = await fetch(`/api/sessions/${sessionId}/frame`);
          if (res.status === 404) {
            statusEl.textContent = "Session expired, reloading...";
            await setup();
            return;
          }
          if (!res.ok) {
            statusEl.textContent = "Error: " + res.status;
            return;
          }
          const data = await res.json();
          draw(data.frame);
          applyViews(data.views);
        } catch (err) {
          statusEl.textContent = err.toString();
        } finally {
          frameInFlight = false;
        }
      }

      (async () => {
        await preload();
        await setup();
        requestAnimationFrame(tick);
      })().catch((err) => { statusEl.textContent = err.toString(); });

      window.addEventListener("beforeunload", () => {
        if (sessionId) {
          fetch(`/api/sessions/${sessionId}`, { method: "DELETE", keepalive: true });
        }
      });
    </script>
  </body>
</html>
"##;

pub const INFO_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Acids and Conjugate Bases - Info</title>
    <style>
      html, body { margin: 0; padding: 0; height: 100%; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      .page { max-width: 860px; margin: 0 auto; padding: 24px; }
      .topbar { display: flex; align-items: center; justify-content: space-between; margin-bottom: 16px; }
      .title { font-size: 24px; font-weight: 600; }
      .back { background: #11151b; border: 1px solid #2a2f36; color: #e6e6e6; border-radius: 8px; padding: 6px 10px; font-size: 12px; text-decoration: none; }
      .back:hover { border-color: #3c6a9e; }
      h2 { margin-top: 24px; font-size: 16px; letter-spacing: 0.02em; }
      p, li { color: #c7cdd6; line-height: 1.6; }
      code, pre { background: #10151c; padding: 10px 12px; border-radius: 6px; display: block; overflow-x: auto; }
    </style>
  </head>
  <body>
    <div class="page">
      <div class="topbar">
        <div class="title">Acids and Conjugate Bases</div>
        <a class="back" href="/">Back</a>
      </div>

      <h2>What you are looking at</h2>
      <p>
        The beaker holds ten conjugate-base particles (blue, marked with a minus sign) and a number of free
        protons (small red particles). When a proton bumps into a free conjugate base the two can react:
        the proton is taken up and the base becomes an acid. Every so often an acid gives its proton back
        and turns into a conjugate base again.
      </p>

      <h2>Controls</h2>
      <ul>
        <li>The slider sets how many free protons you want in the beaker (0 to 64).</li>
        <li>The pH field does the same thing, expressed as pH. Type a value and press Enter.</li>
        <li>Both controls follow the beaker: as bases take up protons the count drops and the pH rises.</li>
      </ul>

      <h2>The pH scale used here</h2>
      <p>This model uses a single straight line between 0 protons (pH 14) and 64 protons (pH 0):</p>
      <pre>pH = -7 (protons - 64) / 32</pre>
      <p>
        It is a teaching simplification, not a real equilibrium calculation. Going from pH back to
        protons drops any fraction, so a pH you type may land one proton below what you expect.
      </p>
    </div>
  </body>
</html>
"##;
